//! Collaborator operations.

use super::{ensure_segment, list_request, repo_path};
use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::PaginationParams;
use crate::stream::ItemStream;
use crate::types::Collaborator;
use serde::Serialize;

/// Service for collaborator operations.
pub struct CollaboratorsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> CollaboratorsService<'a> {
    /// Creates a new collaborators service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists collaborators.
    pub async fn list(
        &self,
        owner: &str,
        repo: &str,
        params: &ListCollaboratorsParams,
    ) -> GitHubResult<Vec<Collaborator>> {
        self.stream(owner, repo, params, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams collaborators.
    pub fn stream(
        &self,
        owner: &str,
        repo: &str,
        params: &ListCollaboratorsParams,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<Collaborator>> {
        let path = format!("{}/collaborators", repo_path(owner, repo)?);
        Ok(self
            .client
            .get_and_flatten_all_pages(list_request(path, params, window)?))
    }

    /// Returns true if `username` collaborates on the repository.
    pub async fn is_collaborator(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> GitHubResult<bool> {
        let path = repo_path(owner, repo)?;
        ensure_segment(username, "username")?;
        self.client
            .exists(&format!("{}/collaborators/{}", path, username))
            .await
    }
}

/// Parameters for listing collaborators.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListCollaboratorsParams {
    /// Filter by affiliation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<Affiliation>,
    /// Filter by permission (pull, triage, push, maintain, admin).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

/// Collaborator affiliation filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Affiliation {
    /// Outside collaborators of the owning organization.
    Outside,
    /// Collaborators with direct permission, whatever their membership.
    Direct,
    /// Every collaborator the caller can see.
    All,
}
