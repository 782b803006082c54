//! Deployment operations.

use super::{ensure_id, list_request, repo_path};
use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::PaginationParams;
use crate::stream::ItemStream;
use crate::types::{Deployment, DeploymentStatus};
use serde::Serialize;

/// Service for deployment operations.
pub struct DeploymentsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> DeploymentsService<'a> {
    /// Creates a new deployments service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists deployments.
    pub async fn list(
        &self,
        owner: &str,
        repo: &str,
        params: &ListDeploymentsParams,
    ) -> GitHubResult<Vec<Deployment>> {
        self.stream(owner, repo, params, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams deployments.
    pub fn stream(
        &self,
        owner: &str,
        repo: &str,
        params: &ListDeploymentsParams,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<Deployment>> {
        let path = format!("{}/deployments", repo_path(owner, repo)?);
        Ok(self
            .client
            .get_and_flatten_all_pages(list_request(path, params, window)?))
    }

    /// Lists the statuses of a deployment, newest first.
    pub async fn list_statuses(
        &self,
        owner: &str,
        repo: &str,
        deployment_id: u64,
    ) -> GitHubResult<Vec<DeploymentStatus>> {
        self.stream_statuses(owner, repo, deployment_id, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams the statuses of a deployment.
    pub fn stream_statuses(
        &self,
        owner: &str,
        repo: &str,
        deployment_id: u64,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<DeploymentStatus>> {
        let path = repo_path(owner, repo)?;
        ensure_id(deployment_id, "deployment_id")?;
        let request = list_request(
            format!("{}/deployments/{}/statuses", path, deployment_id),
            &(),
            window,
        )?;
        Ok(self.client.get_and_flatten_all_pages(request))
    }
}

/// Parameters for listing deployments.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListDeploymentsParams {
    /// Filter by commit SHA.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// Filter by ref (branch, tag or SHA).
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    /// Filter by task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// Filter by environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}
