//! Issue operations.

use super::{list_request, repo_path, SortDirection};
use crate::client::GitHubClient;
use crate::errors::{ensure_positive, GitHubResult};
use crate::pagination::PaginationParams;
use crate::stream::ItemStream;
use crate::types::{Issue, IssueComment};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Service for issue operations.
pub struct IssuesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> IssuesService<'a> {
    /// Creates a new issues service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists issues in a repository.
    pub async fn list(
        &self,
        owner: &str,
        repo: &str,
        params: &ListIssuesParams,
    ) -> GitHubResult<Vec<Issue>> {
        self.stream(owner, repo, params, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams issues in a repository.
    pub fn stream(
        &self,
        owner: &str,
        repo: &str,
        params: &ListIssuesParams,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<Issue>> {
        let path = format!("{}/issues", repo_path(owner, repo)?);
        Ok(self
            .client
            .get_and_flatten_all_pages(list_request(path, params, window)?))
    }

    /// Gets an issue.
    pub async fn get(&self, owner: &str, repo: &str, issue_number: u32) -> GitHubResult<Issue> {
        let path = repo_path(owner, repo)?;
        ensure_positive(issue_number, "issue_number")?;
        self.client
            .get(&format!("{}/issues/{}", path, issue_number))
            .await
    }

    // Comments

    /// Lists comments on an issue.
    pub async fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u32,
    ) -> GitHubResult<Vec<IssueComment>> {
        self.stream_comments(owner, repo, issue_number, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams comments on an issue.
    pub fn stream_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u32,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<IssueComment>> {
        let path = repo_path(owner, repo)?;
        ensure_positive(issue_number, "issue_number")?;
        let request = list_request(
            format!("{}/issues/{}/comments", path, issue_number),
            &(),
            window,
        )?;
        Ok(self.client.get_and_flatten_all_pages(request))
    }
}

/// Parameters for listing issues.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListIssuesParams {
    /// Filter by state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueStateFilter>,
    /// Filter by labels (comma-separated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    /// Filter by assignee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Filter by creator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<IssueSort>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    /// Only issues updated at or after this time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
}

/// Issue state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStateFilter {
    /// Open issues only.
    Open,
    /// Closed issues only.
    Closed,
    /// Open and closed issues.
    All,
}

/// Issue sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSort {
    /// Creation time.
    Created,
    /// Last update time.
    Updated,
    /// Number of comments.
    Comments,
}
