//! Repository invitation operations.

use super::{list_request, repo_path};
use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::PaginationParams;
use crate::stream::ItemStream;
use crate::types::RepositoryInvitation;

/// Service for invitation operations.
pub struct InvitationsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> InvitationsService<'a> {
    /// Creates a new invitations service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists open invitations of a repository.
    pub async fn list_for_repo(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubResult<Vec<RepositoryInvitation>> {
        self.stream_for_repo(owner, repo, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams open invitations of a repository.
    pub fn stream_for_repo(
        &self,
        owner: &str,
        repo: &str,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<RepositoryInvitation>> {
        let path = format!("{}/invitations", repo_path(owner, repo)?);
        Ok(self
            .client
            .get_and_flatten_all_pages(list_request(path, &(), window)?))
    }

    /// Lists invitations received by the authenticated user.
    pub async fn list_for_user(&self) -> GitHubResult<Vec<RepositoryInvitation>> {
        self.stream_for_user(PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams invitations received by the authenticated user.
    pub fn stream_for_user(
        &self,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<RepositoryInvitation>> {
        let request = list_request("/user/repository_invitations".to_string(), &(), window)?;
        Ok(self.client.get_and_flatten_all_pages(request))
    }
}
