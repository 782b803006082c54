//! # GitHub Pagination Library
//!
//! A GitHub REST API client built around automatic multi-page fetching:
//! - Follows `rel="next"` links with an optional page window
//! - Flattens pages into one ordered, cancellable item stream
//! - Typed resource services (repositories, issues, pull requests, projects,
//!   deployments, collaborators, traffic, invitations)
//! - Token or anonymous authentication
//! - Rate limit tracking and `tracing` instrumentation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use integrations_github_pagination::{
//!     AuthMethod, GitHubClient, GitHubConfig, PageRequest, PaginationParams,
//! };
//! use integrations_github_pagination::services::ListIssuesParams;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GitHubConfig::builder()
//!         .auth(AuthMethod::pat("ghp_xxxxxxxxxxxx"))
//!         .build()?;
//!
//!     let client = GitHubClient::new(config)?;
//!
//!     // Stream at most three pages of 50 issues
//!     let mut issues = client.issues().stream(
//!         "octocat",
//!         "hello-world",
//!         &ListIssuesParams::default(),
//!         PaginationParams::new().per_page(50).max_pages(3),
//!     )?;
//!     while let Some(issue) = issues.next().await {
//!         println!("#{}", issue?.number);
//!     }
//!
//!     // Or any list endpoint, collected eagerly
//!     let request = PageRequest::new("/user/repos")?;
//!     let repos: Vec<serde_json::Value> = client.get_all(request).await?;
//!     println!("{} repositories", repos.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Authentication
pub mod auth;

// HTTP client and transport
pub mod client;
pub mod transport;

// Pagination handling
pub mod pagination;
pub mod stream;

// API Services
pub mod services;

// Rate limits
pub mod rate_limit;

// Observability
pub mod observability;

// Mocks for testing
pub mod mocks;

// Re-exports for convenience
pub use auth::{AuthManager, AuthMethod};
pub use client::{GitHubClient, GitHubClientBuilder};
pub use config::{GitHubConfig, GitHubConfigBuilder};
pub use errors::{ErrorCategory, GitHubError, GitHubErrorKind, GitHubResult};
pub use pagination::{Page, PageRequest, Pager, PaginationLinks, PaginationParams, ResponseInfo};
pub use stream::{CancelHandle, Completion, ItemStream, Observer, Subscription};
pub use transport::{HttpRequest, HttpResponse, HttpTransport};
pub use types::*;
