//! Repository traffic statistics. These endpoints are not paginated.

use super::repo_path;
use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::types::{TrafficClones, TrafficPath, TrafficReferrer, TrafficViews};
use serde::Serialize;

/// Service for traffic operations.
pub struct TrafficService<'a> {
    client: &'a GitHubClient,
}

impl<'a> TrafficService<'a> {
    /// Creates a new traffic service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Top 10 referrers over the last 14 days.
    pub async fn referrers(&self, owner: &str, repo: &str) -> GitHubResult<Vec<TrafficReferrer>> {
        let path = repo_path(owner, repo)?;
        self.client
            .get(&format!("{}/traffic/popular/referrers", path))
            .await
    }

    /// Top 10 content paths over the last 14 days.
    pub async fn popular_paths(&self, owner: &str, repo: &str) -> GitHubResult<Vec<TrafficPath>> {
        let path = repo_path(owner, repo)?;
        self.client
            .get(&format!("{}/traffic/popular/paths", path))
            .await
    }

    /// Page views, bucketed per day by default.
    pub async fn views(
        &self,
        owner: &str,
        repo: &str,
        per: Option<TrafficPer>,
    ) -> GitHubResult<TrafficViews> {
        let path = repo_path(owner, repo)?;
        self.client
            .get_with_params(&format!("{}/traffic/views", path), &TrafficParams { per })
            .await
    }

    /// Clones, bucketed per day by default.
    pub async fn clones(
        &self,
        owner: &str,
        repo: &str,
        per: Option<TrafficPer>,
    ) -> GitHubResult<TrafficClones> {
        let path = repo_path(owner, repo)?;
        self.client
            .get_with_params(&format!("{}/traffic/clones", path), &TrafficParams { per })
            .await
    }
}

/// Time bucket of traffic counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficPer {
    /// One bucket per day.
    Day,
    /// One bucket per week.
    Week,
}

#[derive(Debug, Clone, Serialize)]
struct TrafficParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    per: Option<TrafficPer>,
}
