//! GitHub API client implementation.

use crate::auth::{AuthManager, AuthMethod};
use crate::config::{GitHubConfig, GitHubConfigBuilder};
use crate::errors::{ensure_not_empty, GitHubError, GitHubErrorKind, GitHubResult, RateLimitInfo};
use crate::observability::{redact_header, Metrics, RequestTimer, TracingHooks};
use crate::pagination::{decode_page, query_number, Page, PageRequest, Pager, PaginationLinks, ResponseInfo};
use crate::rate_limit::{extract_rate_limit, RateLimitTracker};
use crate::services::*;
use crate::stream::ItemStream;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use url::Url;

/// Media type sent when a request has no `Accept` override.
pub const DEFAULT_ACCEPT: &str = "application/vnd.github+json";

/// GitHub error response format.
#[derive(Debug, serde::Deserialize)]
struct GitHubErrorResponse {
    message: String,
    documentation_url: Option<String>,
}

/// GitHub API client.
///
/// Cloning is cheap: clones share the transport, configuration, rate limit
/// tracker and metrics.
#[derive(Clone)]
pub struct GitHubClient {
    /// HTTP transport.
    transport: Arc<dyn HttpTransport>,
    /// Configuration.
    config: Arc<GitHubConfig>,
    /// Parsed base URL.
    base_url: Url,
    /// Authentication manager. `None` for anonymous access.
    auth: Option<Arc<AuthManager>>,
    /// Rate limit state from the latest response.
    rate_limit: Arc<RateLimitTracker>,
    /// Request metrics.
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.auth.is_some())
            .finish()
    }
}

impl GitHubClient {
    /// Creates a new GitHub client backed by `reqwest`.
    pub fn new(config: GitHubConfig) -> GitHubResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client that sends every request through `transport`.
    pub fn with_transport(
        config: GitHubConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> GitHubResult<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                format!("Base URL is not a valid URL: {}", e),
            )
        })?;

        let auth = config
            .auth
            .clone()
            .map(|method| Arc::new(AuthManager::new(method)));

        Ok(Self {
            transport,
            config: Arc::new(config),
            base_url,
            auth,
            rate_limit: Arc::new(RateLimitTracker::new()),
            metrics: Arc::new(Metrics::new()),
        })
    }

    /// Creates a new client builder.
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::new()
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Gets the configuration.
    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// Gets the request metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Gets the rate limit tracker.
    pub fn rate_limit(&self) -> &RateLimitTracker {
        &self.rate_limit
    }

    // Service accessors

    /// Gets the repositories service.
    pub fn repositories(&self) -> RepositoriesService {
        RepositoriesService::new(self)
    }

    /// Gets the issues service.
    pub fn issues(&self) -> IssuesService {
        IssuesService::new(self)
    }

    /// Gets the pull requests service.
    pub fn pull_requests(&self) -> PullRequestsService {
        PullRequestsService::new(self)
    }

    /// Gets the projects service.
    pub fn projects(&self) -> ProjectsService {
        ProjectsService::new(self)
    }

    /// Gets the deployments service.
    pub fn deployments(&self) -> DeploymentsService {
        DeploymentsService::new(self)
    }

    /// Gets the collaborators service.
    pub fn collaborators(&self) -> CollaboratorsService {
        CollaboratorsService::new(self)
    }

    /// Gets the traffic service.
    pub fn traffic(&self) -> TrafficService {
        TrafficService::new(self)
    }

    /// Gets the invitations service.
    pub fn invitations(&self) -> InvitationsService {
        InvitationsService::new(self)
    }

    // Single requests

    /// Fetches a single resource.
    pub async fn get<T: DeserializeOwned>(&self, location: &str) -> GitHubResult<T> {
        self.get_with_params(location, &()).await
    }

    /// Fetches a single resource with query parameters.
    pub async fn get_with_params<T: DeserializeOwned, P: Serialize>(
        &self,
        location: &str,
        params: &P,
    ) -> GitHubResult<T> {
        ensure_not_empty(location, "location")?;
        let mut url = self.resolve_location(location)?;

        let query_string = serde_urlencoded::to_string(params).map_err(|e| {
            GitHubError::invalid_parameter(format!("Failed to serialize parameters: {}", e))
        })?;
        for (key, value) in url::form_urlencoded::parse(query_string.as_bytes()) {
            url.query_pairs_mut().append_pair(&key, &value);
        }

        let response = self.execute_checked(url, None).await?;

        serde_json::from_slice(&response.body).map_err(|e| {
            GitHubError::deserialization(format!("Failed to deserialize response: {}", e))
                .with_cause(e)
        })
    }

    /// Checks a resource that answers 204 when present and 404 when absent.
    pub async fn exists(&self, location: &str) -> GitHubResult<bool> {
        ensure_not_empty(location, "location")?;
        let url = self.resolve_location(location)?;
        let target = url.to_string();
        let response = self.execute(url, None).await?;

        match response.status {
            status if (200..300).contains(&status) => Ok(true),
            404 => Ok(false),
            _ => Err(Self::fail(&target, &response)),
        }
    }

    // Paging

    /// Fetches exactly one page.
    pub async fn get_page<T: DeserializeOwned>(&self, request: &PageRequest) -> GitHubResult<Page<T>> {
        let mut url = self.resolve_location(request.location())?;
        let query = request.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        let page_number = request
            .window()
            .page
            .or_else(|| query_number(url.as_str(), "page"));
        let per_page = request
            .window()
            .per_page
            .or_else(|| query_number(url.as_str(), "per_page"));

        let response = self.execute_checked(url, request.accept()).await?;
        let (items, total_count) = decode_page(&response.body)?;
        self.metrics.record_page();

        Ok(Page::new(items, PaginationLinks::from_headers(&response.headers))
            .with_page(page_number)
            .with_per_page(per_page)
            .with_total_count(total_count)
            .with_info(ResponseInfo::from_headers(&response.headers)))
    }

    /// Starts a fetch chain that follows `rel="next"` links.
    ///
    /// Nothing is sent until the first [`Pager::next_page`] call.
    pub fn get_all_pages<T: DeserializeOwned>(&self, request: PageRequest) -> Pager<T> {
        Pager::new(self.clone(), request)
    }

    /// Streams the items of every page of a chain, in order.
    pub fn get_and_flatten_all_pages<T>(&self, request: PageRequest) -> ItemStream<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        ItemStream::from_pages(self.get_all_pages(request).into_stream())
    }

    /// Collects the items of every page of a chain.
    pub async fn get_all<T: DeserializeOwned>(&self, request: PageRequest) -> GitHubResult<Vec<T>> {
        self.get_all_pages(request).collect_all().await
    }

    // Internal methods

    /// Resolves a relative path against the base URL, or checks an absolute URL.
    fn resolve_location(&self, location: &str) -> GitHubResult<Url> {
        match Url::parse(location) {
            Ok(url) => {
                self.ensure_trusted(&url)?;
                Ok(url)
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.base_url.as_str().trim_end_matches('/');
                let path = location.trim_start_matches('/');
                Url::parse(&format!("{}/{}", base, path)).map_err(|e| {
                    GitHubError::invalid_parameter(format!("Invalid location '{}': {}", location, e))
                })
            }
            Err(e) => Err(GitHubError::invalid_parameter(format!(
                "Invalid location '{}': {}",
                location, e
            ))),
        }
    }

    /// Accepts the base URL's origin, and `https` URLs on an allowed host.
    fn ensure_trusted(&self, url: &Url) -> GitHubResult<()> {
        let same_origin = url.scheme() == self.base_url.scheme()
            && url.host_str() == self.base_url.host_str()
            && url.port_or_known_default() == self.base_url.port_or_known_default();

        let allowed_host = url.scheme() == "https"
            && url.host_str().map_or(false, |host| {
                self.config
                    .allowed_hosts
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(host))
            });

        if same_origin || allowed_host {
            Ok(())
        } else {
            Err(GitHubError::untrusted_link(format!(
                "Refusing to request untrusted origin {}",
                url.origin().ascii_serialization()
            )))
        }
    }

    fn headers(&self, accept: Option<&str>) -> GitHubResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(accept.unwrap_or(DEFAULT_ACCEPT))?);
        headers.insert(USER_AGENT, header_value(&self.config.user_agent)?);
        headers.insert("x-github-api-version", header_value(&self.config.api_version)?);

        if let Some(auth) = &self.auth {
            let mut value = header_value(&auth.authorization_header())?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Sends a GET request and returns the response whatever its status.
    async fn execute(&self, url: Url, accept: Option<&str>) -> GitHubResult<HttpResponse> {
        let mut request = HttpRequest::get(url);
        request.headers = self.headers(accept)?;
        request.timeout = Some(self.config.timeout);

        let method = request.method.to_string();
        let url = request.url.to_string();
        let logged_headers: Vec<(String, String)> = request
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    redact_header(name.as_str(), value.to_str().unwrap_or_default()),
                )
            })
            .collect();
        TracingHooks::on_request_start(&method, &url, &logged_headers);

        let timer = RequestTimer::new(Arc::clone(&self.metrics));
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                timer.failure();
                TracingHooks::on_request_error(&method, &url, &e.to_string());
                return Err(e);
            }
        };

        let duration = if response.is_success() {
            timer.success()
        } else {
            timer.failure()
        };
        TracingHooks::on_request_complete(&method, &url, response.status, duration);

        if let Some(info) = extract_rate_limit(&response.headers) {
            self.rate_limit.update(&info);
            TracingHooks::on_rate_limit_update(&info);
        }

        Ok(response)
    }

    /// Sends a GET request and maps non-2xx statuses to errors.
    async fn execute_checked(&self, url: Url, accept: Option<&str>) -> GitHubResult<HttpResponse> {
        let target = url.to_string();
        let response = self.execute(url, accept).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(Self::fail(&target, &response))
        }
    }

    fn fail(url: &str, response: &HttpResponse) -> GitHubError {
        let error = Self::handle_error_response(response, extract_rate_limit(&response.headers));
        TracingHooks::on_request_error("GET", url, &error.to_string());
        error
    }

    fn handle_error_response(
        response: &HttpResponse,
        rate_limit: Option<RateLimitInfo>,
    ) -> GitHubError {
        let status = response.status;
        let request_id = response.header("x-github-request-id").map(String::from);

        // Check for rate limit errors
        if status == 403 || status == 429 {
            if let Some(info) = rate_limit.as_ref().filter(|info| info.remaining == 0) {
                let error = GitHubError::rate_limited(info.clone()).with_status(status);
                return match request_id {
                    Some(id) => error.with_request_id(id),
                    None => error,
                };
            }
        }

        let error_body = serde_json::from_slice::<GitHubErrorResponse>(&response.body).ok();

        let message = error_body
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| format!("HTTP {} error", status));

        let documentation_url = error_body.and_then(|e| e.documentation_url);

        let mut error =
            GitHubError::from_response(status, message, documentation_url, request_id);

        if let Some(info) = rate_limit {
            error = error.with_rate_limit(info);
        }

        error
    }
}

fn header_value(value: &str) -> GitHubResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| GitHubError::invalid_parameter(format!("Invalid header value: {}", e)))
}

/// Builder for GitHubClient.
pub struct GitHubClientBuilder {
    config_builder: GitHubConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl GitHubClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: GitHubConfig::builder(),
            transport: None,
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the authentication method.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.config_builder = self.config_builder.auth(auth);
        self
    }

    /// Sets a personal access token.
    pub fn pat(self, token: impl Into<String>) -> Self {
        self.auth(AuthMethod::pat(token))
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Trusts `https` links to an additional host.
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.allow_host(host);
        self
    }

    /// Replaces the `reqwest` transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> GitHubResult<GitHubClient> {
        let config = self.config_builder.build()?;
        match self.transport {
            Some(transport) => GitHubClient::with_transport(config, transport),
            None => GitHubClient::new(config),
        }
    }
}

impl Default for GitHubClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
