//! Mock implementations for testing GitHub API clients.
//!
//! [`MockTransport`] plugs into [`GitHubClient::with_transport`] and answers
//! from queued responses, recording every request it sees.

use crate::client::GitHubClient;
use crate::config::GitHubConfig;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult, RateLimitInfo};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::types::*;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

/// In-memory transport for testing.
///
/// Responses are registered per `METHOD:path` or `METHOD:path?query` and served
/// once each, in registration order. A request is matched against its exact
/// path and query first, then against its path alone.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    /// Response queues by key.
    responses: Arc<RwLock<HashMap<String, VecDeque<MockResponse>>>>,
    /// Request history.
    requests: Arc<RwLock<Vec<MockRequest>>>,
    /// Default behavior.
    default_behavior: DefaultBehavior,
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// Headers.
    pub headers: HashMap<String, String>,
    /// Delay before responding.
    pub delay: Option<std::time::Duration>,
}

impl MockResponse {
    /// Creates a response with a raw body.
    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: HashMap::new(),
            delay: None,
        }
    }

    /// Creates a successful response with the given body.
    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::raw(200, serde_json::to_string(body).unwrap_or_default())
    }

    /// Creates a 204 No Content response.
    pub fn no_content() -> Self {
        Self::raw(204, "")
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(message: &str) -> Self {
        Self::raw(
            404,
            serde_json::json!({
                "message": message,
                "documentation_url": "https://docs.github.com/rest"
            })
            .to_string(),
        )
    }

    /// Creates a 500 Internal Server Error response.
    pub fn server_error(message: &str) -> Self {
        Self::raw(500, serde_json::json!({ "message": message }).to_string())
    }

    /// Creates a rate limit exceeded response.
    pub fn rate_limited() -> Self {
        let reset_at = Utc::now() + Duration::minutes(1);
        Self::raw(
            403,
            serde_json::json!({
                "message": "API rate limit exceeded",
                "documentation_url": "https://docs.github.com/rest/overview/resources-in-the-rest-api#rate-limiting"
            })
            .to_string(),
        )
        .with_rate_limit(5000, 0, reset_at.timestamp())
        .with_header("retry-after", "60")
    }

    /// Adds a delay to the response.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Adds a header to the response.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_lowercase(), value.to_string());
        self
    }

    /// Adds a `Link` header pointing at the next page.
    pub fn with_next_link(self, url: &str) -> Self {
        self.with_header("link", &format!("<{}>; rel=\"next\"", url))
    }

    /// Adds rate limit headers.
    pub fn with_rate_limit(self, limit: u32, remaining: u32, reset_timestamp: i64) -> Self {
        self.with_header("x-ratelimit-limit", &limit.to_string())
            .with_header("x-ratelimit-remaining", &remaining.to_string())
            .with_header("x-ratelimit-reset", &reset_timestamp.to_string())
    }

    fn into_http_response(self) -> GitHubResult<HttpResponse> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                GitHubError::invalid_parameter(format!("Invalid mock header name: {}", e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                GitHubError::invalid_parameter(format!("Invalid mock header value: {}", e))
            })?;
            headers.insert(name, value);
        }

        Ok(HttpResponse {
            status: self.status,
            headers,
            body: Bytes::from(self.body),
        })
    }
}

/// A recorded mock request.
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// HTTP method.
    pub method: String,
    /// Full request URL.
    pub url: String,
    /// Request path.
    pub path: String,
    /// Query string.
    pub query: Option<String>,
    /// Request headers, keyed by lowercase name.
    pub headers: HashMap<String, String>,
    /// Timestamp.
    pub timestamp: DateTime<Utc>,
}

impl MockRequest {
    /// Gets a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

/// Default behavior for unmatched requests.
#[derive(Debug, Clone, Copy, Default)]
pub enum DefaultBehavior {
    /// Answer unmatched requests with a 404 response.
    #[default]
    NotFound,
    /// Fail unmatched requests with a connection error.
    Error,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default behavior for unmatched requests.
    pub fn with_default_behavior(mut self, behavior: DefaultBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }

    /// Creates a client with default configuration that sends through this transport.
    pub fn client(&self) -> GitHubResult<GitHubClient> {
        self.client_with_config(GitHubConfig::default())
    }

    /// Creates a client with `config` that sends through this transport.
    pub fn client_with_config(&self, config: GitHubConfig) -> GitHubResult<GitHubClient> {
        GitHubClient::with_transport(config, Arc::new(self.clone()))
    }

    /// Registers a response for a given method and path (optionally with `?query`).
    pub fn register(&self, method: &str, path: &str, response: MockResponse) {
        let key = format!("{}:{}", method.to_uppercase(), path);
        let mut responses = self
            .responses
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        responses.entry(key).or_default().push_back(response);
    }

    /// Registers a GET response.
    pub fn on_get(&self, path: &str, response: MockResponse) {
        self.register("GET", path, response);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Gets requests matching a method and path prefix.
    pub fn requests_matching(&self, method: &str, path_prefix: &str) -> Vec<MockRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method.eq_ignore_ascii_case(method) && r.path.starts_with(path_prefix))
            .collect()
    }

    /// Verifies that a specific request was made.
    pub fn verify_request(&self, method: &str, path: &str) -> bool {
        self.requests()
            .iter()
            .any(|r| r.method.eq_ignore_ascii_case(method) && r.path == path)
    }

    /// Gets the count of requests made.
    pub fn request_count(&self) -> usize {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of registered responses not served yet.
    pub fn pending_responses(&self) -> usize {
        self.responses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(VecDeque::len)
            .sum()
    }

    /// Clears recorded requests.
    pub fn clear_requests(&self) {
        self.requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Clears requests and responses.
    pub fn reset(&self) {
        self.clear_requests();
        self.responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, request: &HttpRequest) {
        let headers = request
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        self.requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MockRequest {
                method: request.method.to_string(),
                url: request.url.to_string(),
                path: request.url.path().to_string(),
                query: request.url.query().map(String::from),
                headers,
                timestamp: Utc::now(),
            });
    }

    fn take_response(&self, method: &str, path: &str, query: Option<&str>) -> Option<MockResponse> {
        let mut responses = self
            .responses
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut keys = Vec::with_capacity(2);
        if let Some(query) = query {
            keys.push(format!("{}:{}?{}", method, path, query));
        }
        keys.push(format!("{}:{}", method, path));

        keys.iter()
            .find_map(|key| responses.get_mut(key).and_then(VecDeque::pop_front))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> GitHubResult<HttpResponse> {
        self.record(&request);

        let method = request.method.as_str().to_uppercase();
        let response = self.take_response(&method, request.url.path(), request.url.query());

        match response {
            Some(response) => {
                if let Some(delay) = response.delay {
                    tokio::time::sleep(delay).await;
                }
                response.into_http_response()
            }
            None => {
                let message = format!("No mock response for {} {}", method, request.url);
                match self.default_behavior {
                    DefaultBehavior::NotFound => MockResponse::not_found(&message).into_http_response(),
                    DefaultBehavior::Error => {
                        Err(GitHubError::new(GitHubErrorKind::ConnectionFailed, message))
                    }
                }
            }
        }
    }
}

/// Test fixtures for common GitHub types.
pub mod fixtures {
    use super::*;

    fn timestamp() -> DateTime<Utc> {
        DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default()
    }

    /// Creates a test user.
    pub fn user(login: &str) -> User {
        User {
            id: 1,
            login: login.to_string(),
            node_id: format!("MDQ6VXNlcjE={}", login),
            avatar_url: "https://avatars.githubusercontent.com/u/1?v=4".to_string(),
            user_type: "User".to_string(),
            site_admin: false,
            html_url: format!("https://github.com/{}", login),
        }
    }

    /// Creates a test repository.
    pub fn repository(owner: &str, name: &str) -> Repository {
        Repository {
            id: 1,
            node_id: "MDEwOlJlcG9zaXRvcnkx".to_string(),
            name: name.to_string(),
            full_name: format!("{}/{}", owner, name),
            owner: user(owner),
            private: false,
            description: Some("A test repository".to_string()),
            fork: false,
            html_url: format!("https://github.com/{}/{}", owner, name),
            default_branch: Some("main".to_string()),
            language: Some("Rust".to_string()),
            forks_count: 10,
            stargazers_count: 100,
            open_issues_count: 5,
            topics: vec!["rust".to_string(), "api".to_string()],
            archived: false,
            created_at: Some(timestamp()),
            updated_at: Some(timestamp()),
            pushed_at: Some(timestamp()),
        }
    }

    /// Creates a test issue.
    pub fn issue(owner: &str, repo: &str, number: u32) -> Issue {
        Issue {
            id: u64::from(number),
            node_id: format!("I_kwDO{}", number),
            number,
            title: format!("Test issue #{}", number),
            body: Some("This is a test issue".to_string()),
            state: IssueState::Open,
            user: Some(user("testuser")),
            labels: vec![],
            assignees: vec![],
            locked: false,
            comments: 0,
            pull_request: None,
            html_url: format!("https://github.com/{}/{}/issues/{}", owner, repo, number),
            created_at: timestamp(),
            updated_at: timestamp(),
            closed_at: None,
        }
    }

    /// Creates a test label.
    pub fn label(name: &str, color: &str) -> Label {
        Label {
            id: 1,
            node_id: "LA_kwDO".to_string(),
            name: name.to_string(),
            description: Some(format!("The {} label", name)),
            color: color.to_string(),
            default: false,
        }
    }

    /// Creates a test branch.
    pub fn branch(name: &str) -> Branch {
        Branch {
            name: name.to_string(),
            commit: BranchCommit {
                sha: "abc123def456".to_string(),
                url: "https://api.github.com/repos/owner/repo/commits/abc123def456".to_string(),
            },
            protected: false,
        }
    }

    /// Creates a test pull request.
    pub fn pull_request(owner: &str, repo: &str, number: u32) -> PullRequest {
        PullRequest {
            id: u64::from(number),
            node_id: format!("PR_kwDO{}", number),
            number,
            state: PullRequestState::Open,
            title: format!("Test PR #{}", number),
            body: Some("This is a test pull request".to_string()),
            user: Some(user("testuser")),
            draft: false,
            head: PullRequestRef {
                label: format!("testuser:feature-{}", number),
                git_ref: format!("feature-{}", number),
                sha: "abc123".to_string(),
                user: Some(user("testuser")),
                repo: None,
            },
            base: PullRequestRef {
                label: format!("{}:main", owner),
                git_ref: "main".to_string(),
                sha: "def456".to_string(),
                user: Some(user(owner)),
                repo: Some(Box::new(repository(owner, repo))),
            },
            html_url: format!("https://github.com/{}/{}/pull/{}", owner, repo, number),
            created_at: timestamp(),
            updated_at: timestamp(),
            closed_at: None,
            merged_at: None,
        }
    }

    /// Creates a test project.
    pub fn project(id: u64, name: &str) -> Project {
        Project {
            id,
            node_id: format!("MDc6UHJvamVjdDE{}", id),
            name: name.to_string(),
            body: None,
            number: 1,
            state: "open".to_string(),
            creator: Some(user("octocat")),
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    /// Creates a test deployment.
    pub fn deployment(id: u64, environment: &str) -> Deployment {
        Deployment {
            id,
            node_id: format!("MDEwOkRlcGxveW1lbnQx{}", id),
            sha: "a84d88e7554fc1fa21bcbc4efae3c782a70d2b9d".to_string(),
            git_ref: "main".to_string(),
            task: "deploy".to_string(),
            environment: environment.to_string(),
            description: None,
            creator: Some(user("octocat")),
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    /// Creates a test collaborator.
    pub fn collaborator(login: &str) -> Collaborator {
        Collaborator {
            id: 1,
            login: login.to_string(),
            node_id: format!("MDQ6VXNlcjE={}", login),
            avatar_url: String::new(),
            permissions: Some(CollaboratorPermissions {
                pull: true,
                push: true,
                ..CollaboratorPermissions::default()
            }),
            role_name: Some("write".to_string()),
        }
    }

    /// Creates rate limit info.
    pub fn rate_limit_info(limit: u32, remaining: u32) -> RateLimitInfo {
        RateLimitInfo {
            limit,
            remaining,
            reset_at: Utc::now() + Duration::hours(1),
            retry_after: None,
            resource: Some("core".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn get(url: &str) -> HttpRequest {
        HttpRequest::get(Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn test_mock_transport_basic() {
        let mock = MockTransport::new();
        let repo = fixtures::repository("octocat", "hello-world");
        mock.on_get("/repos/octocat/hello-world", MockResponse::ok(&repo));

        let response = mock
            .send(get("https://api.github.com/repos/octocat/hello-world"))
            .await
            .unwrap();

        let decoded: Repository = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(decoded.full_name, "octocat/hello-world");
        assert!(mock.verify_request("GET", "/repos/octocat/hello-world"));
        assert_eq!(mock.pending_responses(), 0);
    }

    #[tokio::test]
    async fn test_query_match_precedes_path_match() {
        let mock = MockTransport::new();
        mock.on_get("/items", MockResponse::raw(200, "[0]"));
        mock.on_get("/items?page=2", MockResponse::raw(200, "[2]"));

        let second = mock.send(get("https://api.github.com/items?page=2")).await.unwrap();
        let first = mock.send(get("https://api.github.com/items?page=1")).await.unwrap();

        assert_eq!(&second.body[..], b"[2]");
        assert_eq!(&first.body[..], b"[0]");
        assert_eq!(mock.requests()[0].query.as_deref(), Some("page=2"));
    }

    #[tokio::test]
    async fn test_responses_served_once_in_order() {
        let mock = MockTransport::new();
        mock.on_get("/x", MockResponse::raw(200, "1"));
        mock.on_get("/x", MockResponse::raw(200, "2"));

        let a = mock.send(get("https://api.github.com/x")).await.unwrap();
        let b = mock.send(get("https://api.github.com/x")).await.unwrap();
        let c = mock.send(get("https://api.github.com/x")).await.unwrap();

        assert_eq!(&a.body[..], b"1");
        assert_eq!(&b.body[..], b"2");
        assert_eq!(c.status, 404);
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_default_behavior_error() {
        let mock = MockTransport::new().with_default_behavior(DefaultBehavior::Error);
        let err = mock.send(get("https://api.github.com/nothing")).await.unwrap_err();
        assert_eq!(*err.kind(), GitHubErrorKind::ConnectionFailed);
    }

    #[test]
    fn test_response_headers() {
        let response = MockResponse::ok(&vec![1])
            .with_next_link("https://api.github.com/items?page=2")
            .with_rate_limit(5000, 4999, 1_700_000_000)
            .into_http_response()
            .unwrap();

        assert_eq!(
            response.header("link"),
            Some("<https://api.github.com/items?page=2>; rel=\"next\"")
        );
        assert_eq!(response.header("x-ratelimit-remaining"), Some("4999"));
    }

    #[test]
    fn test_fixtures() {
        let user = fixtures::user("octocat");
        assert_eq!(user.login, "octocat");

        let repo = fixtures::repository("octocat", "hello-world");
        assert_eq!(repo.full_name, "octocat/hello-world");

        let issue = fixtures::issue("octocat", "hello-world", 1);
        assert_eq!(issue.number, 1);
    }
}
