//! Pull request operations.

use super::{list_request, repo_path, SortDirection};
use crate::client::GitHubClient;
use crate::errors::{ensure_positive, GitHubResult};
use crate::pagination::PaginationParams;
use crate::stream::ItemStream;
use crate::types::{PullRequest, PullRequestCommit, PullRequestFile};
use serde::Serialize;

/// Service for pull request operations.
pub struct PullRequestsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> PullRequestsService<'a> {
    /// Creates a new pull requests service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists pull requests.
    pub async fn list(
        &self,
        owner: &str,
        repo: &str,
        params: &ListPullRequestsParams,
    ) -> GitHubResult<Vec<PullRequest>> {
        self.stream(owner, repo, params, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams pull requests.
    pub fn stream(
        &self,
        owner: &str,
        repo: &str,
        params: &ListPullRequestsParams,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<PullRequest>> {
        let path = format!("{}/pulls", repo_path(owner, repo)?);
        Ok(self
            .client
            .get_and_flatten_all_pages(list_request(path, params, window)?))
    }

    /// Gets a pull request.
    pub async fn get(&self, owner: &str, repo: &str, pull_number: u32) -> GitHubResult<PullRequest> {
        self.client.get(&self.pull_path(owner, repo, pull_number)?).await
    }

    /// Lists files changed by a pull request.
    pub async fn list_files(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u32,
    ) -> GitHubResult<Vec<PullRequestFile>> {
        self.stream_files(owner, repo, pull_number, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams files changed by a pull request.
    pub fn stream_files(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u32,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<PullRequestFile>> {
        let path = format!("{}/files", self.pull_path(owner, repo, pull_number)?);
        Ok(self
            .client
            .get_and_flatten_all_pages(list_request(path, &(), window)?))
    }

    /// Lists commits on a pull request.
    pub async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u32,
    ) -> GitHubResult<Vec<PullRequestCommit>> {
        self.stream_commits(owner, repo, pull_number, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams commits on a pull request.
    pub fn stream_commits(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u32,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<PullRequestCommit>> {
        let path = format!("{}/commits", self.pull_path(owner, repo, pull_number)?);
        Ok(self
            .client
            .get_and_flatten_all_pages(list_request(path, &(), window)?))
    }

    fn pull_path(&self, owner: &str, repo: &str, pull_number: u32) -> GitHubResult<String> {
        let path = repo_path(owner, repo)?;
        ensure_positive(pull_number, "pull_number")?;
        Ok(format!("{}/pulls/{}", path, pull_number))
    }
}

/// Parameters for listing pull requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListPullRequestsParams {
    /// Filter by state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PullRequestStateFilter>,
    /// Filter by head (user:ref-name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    /// Filter by base branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<PullRequestSort>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

/// Pull request state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestStateFilter {
    /// Open pull requests only.
    Open,
    /// Closed or merged pull requests only.
    Closed,
    /// Every pull request.
    All,
}

/// Pull request sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestSort {
    /// Creation time.
    Created,
    /// Last update time.
    Updated,
    /// Comment count.
    Popularity,
    /// Age, filtering out pull requests updated in the last month.
    LongRunning,
}
