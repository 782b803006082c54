//! GitHub API service implementations.
//!
//! Services are thin: they check their arguments, build a path and hand a
//! [`PageRequest`] to the client. List operations come in two shapes, an eager
//! one returning a `Vec` and a `stream_*` one returning an [`ItemStream`].
//!
//! [`ItemStream`]: crate::stream::ItemStream

mod collaborators;
mod deployments;
mod invitations;
mod issues;
mod projects;
mod pull_requests;
mod repositories;
mod traffic;

pub use collaborators::*;
pub use deployments::*;
pub use invitations::*;
pub use issues::*;
pub use projects::*;
pub use pull_requests::*;
pub use repositories::*;
pub use traffic::*;

use crate::errors::{ensure_not_empty, GitHubError, GitHubResult};
use crate::pagination::{PageRequest, PaginationParams};
use serde::Serialize;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Path of a repository, after checking both names.
pub(crate) fn repo_path(owner: &str, repo: &str) -> GitHubResult<String> {
    ensure_segment(owner, "owner")?;
    ensure_segment(repo, "repo")?;
    Ok(format!("/repos/{}/{}", owner, repo))
}

/// Checks a value that becomes one path segment.
///
/// Fails with `MissingParameter` when blank, and with `InvalidParameter` when it
/// could leave its segment: separators, `?`, `#`, `%`, or a dot segment.
pub(crate) fn ensure_segment(value: &str, name: &str) -> GitHubResult<()> {
    ensure_not_empty(value, name)?;
    if value == "." || value == ".." || value.contains(['/', '\\', '?', '#', '%']) {
        return Err(GitHubError::invalid_parameter(format!(
            "'{}' must be a single path segment",
            name
        )));
    }
    Ok(())
}

/// Fails with `InvalidParameter` for a zero resource ID.
pub(crate) fn ensure_id(id: u64, name: &str) -> GitHubResult<()> {
    if id == 0 {
        return Err(GitHubError::invalid_parameter(format!(
            "'{}' must be greater than zero",
            name
        )));
    }
    Ok(())
}

/// Builds a list request from a path, a filter struct and a window.
pub(crate) fn list_request<F: Serialize>(
    path: String,
    filter: &F,
    window: PaginationParams,
) -> GitHubResult<PageRequest> {
    PageRequest::new(path)?
        .with_filter(filter)?
        .with_window(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GitHubErrorKind;

    #[test]
    fn test_repo_path() {
        assert_eq!(repo_path("octocat", "hello-world").unwrap(), "/repos/octocat/hello-world");
        assert_eq!(
            *repo_path("", "hello-world").unwrap_err().kind(),
            GitHubErrorKind::MissingParameter
        );
        assert!(repo_path("octocat", " ").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_repo_path_rejects_escaping_segments() {
        for (owner, repo) in [
            ("octocat", "hello/../../../user"),
            ("..", "user"),
            ("octocat", "."),
            ("octocat", "hello?admin=1"),
            ("octocat", "hello#x"),
            ("octocat", "%2e%2e"),
            ("octo\\cat", "hello"),
        ] {
            let err = repo_path(owner, repo).unwrap_err();
            assert_eq!(*err.kind(), GitHubErrorKind::InvalidParameter);
        }
        assert!(repo_path("octo.cat", "hello.world").is_ok());
        assert!(repo_path("octocat", "..hello").is_ok());
    }

    #[test]
    fn test_ensure_id() {
        assert!(ensure_id(7, "project_id").is_ok());
        assert!(ensure_id(0, "project_id").unwrap_err().is_invalid_argument());
    }

    #[derive(Serialize)]
    struct Filter {
        direction: SortDirection,
    }

    #[test]
    fn test_list_request() {
        let request = list_request(
            "/user/repos".to_string(),
            &Filter {
                direction: SortDirection::Desc,
            },
            PaginationParams::new().per_page(50),
        )
        .unwrap();

        assert_eq!(
            request.query(),
            vec![
                ("direction".to_string(), "desc".to_string()),
                ("per_page".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_filter_enum_names() {
        let request = list_request(
            "/repos/octocat/hello-world/pulls".to_string(),
            &ListPullRequestsParams {
                state: Some(PullRequestStateFilter::All),
                sort: Some(PullRequestSort::LongRunning),
                ..Default::default()
            },
            PaginationParams::new(),
        )
        .unwrap();
        assert_eq!(
            request.query(),
            vec![
                ("sort".to_string(), "long_running".to_string()),
                ("state".to_string(), "all".to_string()),
            ]
        );

        let request = list_request(
            "/projects/columns/1/cards".to_string(),
            &ListCardsParams {
                archived_state: Some(ArchivedState::NotArchived),
            },
            PaginationParams::new(),
        )
        .unwrap();
        assert_eq!(request.parameters().get("archived_state").map(String::as_str), Some("not_archived"));
    }
}
