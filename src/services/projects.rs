//! Classic project board operations.
//!
//! These endpoints sit behind the `inertia` preview; every request carries
//! [`INERTIA_PREVIEW`] as its `Accept` header, on every page.

use super::{ensure_id, ensure_segment, list_request, repo_path};
use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::PaginationParams;
use crate::stream::ItemStream;
use crate::types::{Project, ProjectCard, ProjectColumn};
use serde::Serialize;

/// Preview media type of the classic projects API.
pub const INERTIA_PREVIEW: &str = "application/vnd.github.inertia-preview+json";

/// Service for project operations.
pub struct ProjectsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> ProjectsService<'a> {
    /// Creates a new projects service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists projects of a repository.
    pub async fn list_for_repo(
        &self,
        owner: &str,
        repo: &str,
        params: &ListProjectsParams,
    ) -> GitHubResult<Vec<Project>> {
        self.stream_for_repo(owner, repo, params, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams projects of a repository.
    pub fn stream_for_repo(
        &self,
        owner: &str,
        repo: &str,
        params: &ListProjectsParams,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<Project>> {
        let path = format!("{}/projects", repo_path(owner, repo)?);
        self.stream_preview(path, params, window)
    }

    /// Lists projects of an organization.
    pub async fn list_for_org(
        &self,
        org: &str,
        params: &ListProjectsParams,
    ) -> GitHubResult<Vec<Project>> {
        self.stream_for_org(org, params, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams projects of an organization.
    pub fn stream_for_org(
        &self,
        org: &str,
        params: &ListProjectsParams,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<Project>> {
        ensure_segment(org, "org")?;
        self.stream_preview(format!("/orgs/{}/projects", org), params, window)
    }

    /// Lists the columns of a project.
    pub async fn list_columns(&self, project_id: u64) -> GitHubResult<Vec<ProjectColumn>> {
        self.stream_columns(project_id, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams the columns of a project.
    pub fn stream_columns(
        &self,
        project_id: u64,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<ProjectColumn>> {
        ensure_id(project_id, "project_id")?;
        self.stream_preview(format!("/projects/{}/columns", project_id), &(), window)
    }

    /// Lists the cards of a column.
    pub async fn list_cards(
        &self,
        column_id: u64,
        params: &ListCardsParams,
    ) -> GitHubResult<Vec<ProjectCard>> {
        self.stream_cards(column_id, params, PaginationParams::default())?
            .collect_all()
            .await
    }

    /// Streams the cards of a column.
    pub fn stream_cards(
        &self,
        column_id: u64,
        params: &ListCardsParams,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<ProjectCard>> {
        ensure_id(column_id, "column_id")?;
        self.stream_preview(format!("/projects/columns/{}/cards", column_id), params, window)
    }

    fn stream_preview<T, F>(
        &self,
        path: String,
        filter: &F,
        window: PaginationParams,
    ) -> GitHubResult<ItemStream<T>>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
        F: Serialize,
    {
        let request = list_request(path, filter, window)?.with_accept(INERTIA_PREVIEW);
        Ok(self.client.get_and_flatten_all_pages(request))
    }
}

/// Parameters for listing projects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListProjectsParams {
    /// Filter by state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ProjectStateFilter>,
}

/// Project state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStateFilter {
    /// Open projects only.
    Open,
    /// Closed projects only.
    Closed,
    /// Open and closed projects.
    All,
}

/// Parameters for listing project cards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListCardsParams {
    /// Filter by archived state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_state: Option<ArchivedState>,
}

/// Archived state filter for cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchivedState {
    /// Archived and active cards.
    All,
    /// Archived cards only.
    Archived,
    /// Active cards only.
    NotArchived,
}
