//! Core data types for GitHub API.
//!
//! These are plain data holders. Fields GitHub omits from list responses are
//! optional or defaulted so the same type decodes both list and detail bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub user (minimal representation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: u64,
    /// Username (login).
    pub login: String,
    /// User node ID.
    #[serde(default)]
    pub node_id: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: String,
    /// User type (User, Organization, Bot).
    #[serde(rename = "type", default)]
    pub user_type: String,
    /// Site admin flag.
    #[serde(default)]
    pub site_admin: bool,
    /// Profile URL.
    #[serde(default)]
    pub html_url: String,
}

/// GitHub repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Repository name.
    pub name: String,
    /// Full name (owner/repo).
    pub full_name: String,
    /// Owner information.
    pub owner: User,
    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,
    /// Repository description.
    pub description: Option<String>,
    /// Whether the repository is a fork.
    #[serde(default)]
    pub fork: bool,
    /// HTML URL.
    #[serde(default)]
    pub html_url: String,
    /// Default branch.
    #[serde(default)]
    pub default_branch: Option<String>,
    /// Primary language.
    pub language: Option<String>,
    /// Fork count.
    #[serde(default)]
    pub forks_count: u32,
    /// Stargazer count.
    #[serde(default)]
    pub stargazers_count: u32,
    /// Open issue count.
    #[serde(default)]
    pub open_issues_count: u32,
    /// Topics.
    #[serde(default)]
    pub topics: Vec<String>,
    /// Whether the repository is archived.
    #[serde(default)]
    pub archived: bool,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Last push time.
    pub pushed_at: Option<DateTime<Utc>>,
}

/// GitHub branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name.
    pub name: String,
    /// Commit reference.
    pub commit: BranchCommit,
    /// Whether branch is protected.
    #[serde(default)]
    pub protected: bool,
}

/// Branch commit reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchCommit {
    /// Commit SHA.
    pub sha: String,
    /// Commit URL.
    pub url: String,
}

/// GitHub issue.
///
/// The issues endpoints also return pull requests; those carry `pull_request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Issue number.
    pub number: u32,
    /// Issue title.
    pub title: String,
    /// Issue body.
    pub body: Option<String>,
    /// Issue state.
    pub state: IssueState,
    /// Issue author.
    pub user: Option<User>,
    /// Labels.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Assignees.
    #[serde(default)]
    pub assignees: Vec<User>,
    /// Whether the issue is locked.
    #[serde(default)]
    pub locked: bool,
    /// Comment count.
    #[serde(default)]
    pub comments: u32,
    /// Set when the issue is a pull request.
    pub pull_request: Option<serde_json::Value>,
    /// HTML URL.
    #[serde(default)]
    pub html_url: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Close time.
    pub closed_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Returns true if this issue is a pull request.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Issue state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// Open issue.
    Open,
    /// Closed issue.
    Closed,
}

/// GitHub label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Label ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Label name.
    pub name: String,
    /// Label description.
    pub description: Option<String>,
    /// Label color (hex).
    pub color: String,
    /// Whether this is a default label.
    #[serde(default)]
    pub default: bool,
}

/// Comment on an issue or pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueComment {
    /// Comment ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Comment body.
    pub body: Option<String>,
    /// Comment author.
    pub user: Option<User>,
    /// HTML URL.
    #[serde(default)]
    pub html_url: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// GitHub pull request as returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// PR number.
    pub number: u32,
    /// PR state.
    pub state: PullRequestState,
    /// PR title.
    pub title: String,
    /// PR body.
    pub body: Option<String>,
    /// PR author.
    pub user: Option<User>,
    /// Whether the PR is a draft.
    #[serde(default)]
    pub draft: bool,
    /// Head branch.
    pub head: PullRequestRef,
    /// Base branch.
    pub base: PullRequestRef,
    /// HTML URL.
    #[serde(default)]
    pub html_url: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Close time.
    pub closed_at: Option<DateTime<Utc>>,
    /// Merge time.
    pub merged_at: Option<DateTime<Utc>>,
}

/// Pull request state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// Open PR.
    Open,
    /// Closed PR.
    Closed,
}

/// Pull request branch reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Label (owner:branch).
    pub label: String,
    /// Branch name.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Commit SHA.
    pub sha: String,
    /// Repository owner.
    pub user: Option<User>,
    /// Repository. `None` when the fork was deleted.
    pub repo: Option<Box<Repository>>,
}

/// File changed by a pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestFile {
    /// Blob SHA.
    pub sha: String,
    /// File path.
    pub filename: String,
    /// Change status (added, removed, modified, renamed, ...).
    pub status: String,
    /// Added lines.
    pub additions: u32,
    /// Deleted lines.
    pub deletions: u32,
    /// Total changed lines.
    pub changes: u32,
    /// Unified diff, absent for binary or very large files.
    pub patch: Option<String>,
    /// Previous path of a renamed file.
    pub previous_filename: Option<String>,
}

/// Commit on a pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestCommit {
    /// Commit SHA.
    pub sha: String,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Git commit data.
    pub commit: CommitDetails,
    /// GitHub account of the author, when known.
    pub author: Option<User>,
}

/// Git-level commit data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetails {
    /// Commit message.
    pub message: String,
    /// Git author.
    pub author: Option<GitActor>,
    /// Git committer.
    pub committer: Option<GitActor>,
}

/// Git author or committer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitActor {
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Timestamp.
    pub date: Option<DateTime<Utc>>,
}

/// Repository deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Deployment ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Deployed commit SHA.
    pub sha: String,
    /// Deployed ref.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Deployment task.
    pub task: String,
    /// Target environment.
    pub environment: String,
    /// Description.
    pub description: Option<String>,
    /// Creator.
    pub creator: Option<User>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Status of a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    /// Status ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// State (error, failure, inactive, in_progress, queued, pending, success).
    pub state: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Environment.
    pub environment: Option<String>,
    /// Target URL.
    pub target_url: Option<String>,
    /// Creator.
    pub creator: Option<User>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Classic project board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Project name.
    pub name: String,
    /// Project description.
    pub body: Option<String>,
    /// Project number.
    pub number: u32,
    /// State (open, closed).
    pub state: String,
    /// Creator.
    pub creator: Option<User>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Column of a classic project board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectColumn {
    /// Column ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Column name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Card in a project column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCard {
    /// Card ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Free-text note; `None` for issue or PR cards.
    pub note: Option<String>,
    /// Whether the card is archived.
    #[serde(default)]
    pub archived: bool,
    /// API URL of the linked issue or PR.
    pub content_url: Option<String>,
    /// Creator.
    pub creator: Option<User>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Repository collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    /// User ID.
    pub id: u64,
    /// Username.
    pub login: String,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: String,
    /// Permissions on the repository.
    pub permissions: Option<CollaboratorPermissions>,
    /// Role name (read, triage, write, maintain, admin or a custom role).
    pub role_name: Option<String>,
}

/// Permission flags of a collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorPermissions {
    /// Can pull.
    #[serde(default)]
    pub pull: bool,
    /// Can triage.
    #[serde(default)]
    pub triage: bool,
    /// Can push.
    #[serde(default)]
    pub push: bool,
    /// Can maintain.
    #[serde(default)]
    pub maintain: bool,
    /// Is admin.
    #[serde(default)]
    pub admin: bool,
}

/// Invitation to collaborate on a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInvitation {
    /// Invitation ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Target repository.
    pub repository: Repository,
    /// Invited user.
    pub invitee: Option<User>,
    /// Inviting user.
    pub inviter: Option<User>,
    /// Granted permission (read, write, admin, ...).
    pub permissions: String,
    /// Whether the invitation expired.
    #[serde(default)]
    pub expired: bool,
    /// HTML URL.
    #[serde(default)]
    pub html_url: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Top referring site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficReferrer {
    /// Referrer host.
    pub referrer: String,
    /// Total views.
    pub count: u64,
    /// Unique visitors.
    pub uniques: u64,
}

/// Popular content path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficPath {
    /// Path.
    pub path: String,
    /// Page title.
    pub title: String,
    /// Total views.
    pub count: u64,
    /// Unique visitors.
    pub uniques: u64,
}

/// Traffic count for one day or week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficCount {
    /// Start of the bucket.
    pub timestamp: DateTime<Utc>,
    /// Total count.
    pub count: u64,
    /// Unique count.
    pub uniques: u64,
}

/// Page views over the last 14 days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficViews {
    /// Total views.
    pub count: u64,
    /// Unique visitors.
    pub uniques: u64,
    /// Per-bucket views.
    #[serde(default)]
    pub views: Vec<TrafficCount>,
}

/// Clones over the last 14 days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficClones {
    /// Total clones.
    pub count: u64,
    /// Unique cloners.
    pub uniques: u64,
    /// Per-bucket clones.
    #[serde(default)]
    pub clones: Vec<TrafficCount>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_from_list_body() {
        let issue: Issue = serde_json::from_value(json!({
            "id": 1,
            "number": 1347,
            "title": "Found a bug",
            "body": null,
            "state": "open",
            "user": {"id": 1, "login": "octocat"},
            "labels": [{"id": 208045946, "name": "bug", "color": "f29513", "description": null}],
            "created_at": "2011-04-22T13:33:48Z",
            "updated_at": "2011-04-22T13:33:48Z",
            "closed_at": null
        }))
        .unwrap();

        assert_eq!(issue.number, 1347);
        assert_eq!(issue.state, IssueState::Open);
        assert_eq!(issue.labels[0].name, "bug");
        assert!(!issue.is_pull_request());
    }

    #[test]
    fn test_pull_request_with_deleted_fork() {
        let pr: PullRequest = serde_json::from_value(json!({
            "id": 1,
            "number": 42,
            "state": "closed",
            "title": "Amazing new feature",
            "body": null,
            "user": null,
            "head": {"label": "ghost:main", "ref": "main", "sha": "6dcb09b", "user": null, "repo": null},
            "base": {"label": "octocat:main", "ref": "main", "sha": "6dcb09c", "user": null, "repo": null},
            "created_at": "2011-01-26T19:01:12Z",
            "updated_at": "2011-01-26T19:01:12Z",
            "closed_at": "2011-01-26T19:01:12Z",
            "merged_at": null
        }))
        .unwrap();

        assert_eq!(pr.head.git_ref, "main");
        assert!(pr.head.repo.is_none());
        assert_eq!(pr.state, PullRequestState::Closed);
    }

    #[test]
    fn test_traffic_views() {
        let views: TrafficViews = serde_json::from_value(json!({
            "count": 14850,
            "uniques": 3782,
            "views": [{"timestamp": "2016-10-10T00:00:00Z", "count": 440, "uniques": 143}]
        }))
        .unwrap();

        assert_eq!(views.views.len(), 1);
        assert_eq!(views.views[0].count, 440);
    }

    #[test]
    fn test_collaborator_permissions_default() {
        let collaborator: Collaborator = serde_json::from_value(json!({
            "id": 1,
            "login": "octocat",
            "permissions": {"pull": true, "push": false, "admin": false}
        }))
        .unwrap();

        let permissions = collaborator.permissions.unwrap();
        assert!(permissions.pull);
        assert!(!permissions.maintain);
    }
}
