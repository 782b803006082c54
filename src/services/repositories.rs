//! Repository operations.

use super::{ensure_segment, list_request, repo_path, SortDirection};
use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::PaginationParams;
use crate::stream::ItemStream;
use crate::types::{Branch, Repository};
use serde::Serialize;

/// Service for repository operations.
pub struct RepositoriesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> RepositoriesService<'a> {
    /// Creates a new repositories service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists public repositories of a user.
    pub async fn list_for_user(
        &self,
        username: &str,
        params: &ListRepositoriesParams,
    ) -> GitHubResult<Vec<Repository>> {
        self.stream_for_user(username, params, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams the repositories of a user.
    pub fn stream_for_user(
        &self,
        username: &str,
        params: &ListRepositoriesParams,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<Repository>> {
        ensure_segment(username, "username")?;
        let request = list_request(format!("/users/{}/repos", username), params, window)?;
        Ok(self.client.get_and_flatten_all_pages(request))
    }

    /// Lists repositories of an organization.
    pub async fn list_for_org(
        &self,
        org: &str,
        params: &ListRepositoriesParams,
    ) -> GitHubResult<Vec<Repository>> {
        self.stream_for_org(org, params, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams the repositories of an organization.
    pub fn stream_for_org(
        &self,
        org: &str,
        params: &ListRepositoriesParams,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<Repository>> {
        ensure_segment(org, "org")?;
        let request = list_request(format!("/orgs/{}/repos", org), params, window)?;
        Ok(self.client.get_and_flatten_all_pages(request))
    }

    /// Gets a repository.
    pub async fn get(&self, owner: &str, repo: &str) -> GitHubResult<Repository> {
        self.client.get(&repo_path(owner, repo)?).await
    }

    /// Lists branches.
    pub async fn list_branches(&self, owner: &str, repo: &str) -> GitHubResult<Vec<Branch>> {
        self.stream_branches(owner, repo, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams branches.
    pub fn stream_branches(
        &self,
        owner: &str,
        repo: &str,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<Branch>> {
        let path = format!("{}/branches", repo_path(owner, repo)?);
        let request = list_request(path, &(), window)?;
        Ok(self.client.get_and_flatten_all_pages(request))
    }
}

/// Parameters for listing repositories.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListRepositoriesParams {
    /// Repository type filter.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub repo_type: Option<RepositoryType>,
    /// Sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<RepositorySort>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

/// Repository type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    /// Every repository.
    All,
    /// Repositories owned by the user.
    Owner,
    /// Public repositories.
    Public,
    /// Private repositories.
    Private,
    /// Forks only.
    Forks,
    /// Non-fork repositories.
    Sources,
    /// Repositories the user is a member of.
    Member,
}

/// Repository sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositorySort {
    /// Creation time.
    Created,
    /// Last update time.
    Updated,
    /// Last push time.
    Pushed,
    /// Full name.
    FullName,
}
