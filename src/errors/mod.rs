//! Error types for the GitHub client.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Result type alias for GitHub operations.
pub type GitHubResult<T> = Result<T, GitHubError>;

/// Error kinds for categorizing GitHub errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubErrorKind {
    // Configuration errors
    /// Invalid base URL.
    InvalidBaseUrl,
    /// Invalid configuration.
    InvalidConfiguration,

    // Argument errors
    /// Invalid parameter.
    InvalidParameter,
    /// Missing required parameter.
    MissingParameter,

    // Authentication and authorization errors
    /// Bad credentials (401).
    BadCredentials,
    /// Access forbidden (403).
    Forbidden,

    // Request errors
    /// Request validation failed (400).
    ValidationError,
    /// Unprocessable entity (422).
    UnprocessableEntity,

    // Resource errors
    /// Resource not found (404).
    NotFound,
    /// Resource is gone (410).
    Gone,
    /// Resource conflict (409).
    Conflict,

    // Rate limit errors
    /// Primary rate limit exceeded.
    PrimaryRateLimitExceeded,
    /// Secondary rate limit exceeded.
    SecondaryRateLimitExceeded,

    // Transport errors
    /// Connection failed.
    ConnectionFailed,
    /// Request timeout.
    Timeout,
    /// A link points outside the trusted API hosts.
    UntrustedLink,

    // Server errors
    /// Internal server error (500).
    InternalError,
    /// Bad gateway (502).
    BadGateway,
    /// Service unavailable (503).
    ServiceUnavailable,

    // Response errors
    /// Failed to deserialize response.
    DeserializationError,

    // Generic
    /// Unknown error.
    Unknown,
}

impl fmt::Display for GitHubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl => write!(f, "invalid_base_url"),
            Self::InvalidConfiguration => write!(f, "invalid_configuration"),
            Self::InvalidParameter => write!(f, "invalid_parameter"),
            Self::MissingParameter => write!(f, "missing_parameter"),
            Self::BadCredentials => write!(f, "bad_credentials"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::ValidationError => write!(f, "validation_error"),
            Self::UnprocessableEntity => write!(f, "unprocessable_entity"),
            Self::NotFound => write!(f, "not_found"),
            Self::Gone => write!(f, "gone"),
            Self::Conflict => write!(f, "conflict"),
            Self::PrimaryRateLimitExceeded => write!(f, "primary_rate_limit_exceeded"),
            Self::SecondaryRateLimitExceeded => write!(f, "secondary_rate_limit_exceeded"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::UntrustedLink => write!(f, "untrusted_link"),
            Self::InternalError => write!(f, "internal_error"),
            Self::BadGateway => write!(f, "bad_gateway"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::DeserializationError => write!(f, "deserialization_error"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Broad failure classes a caller of the paging core has to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A required argument was empty or out of range; nothing was sent.
    InvalidArgument,
    /// The client itself is misconfigured.
    Configuration,
    /// Network failure, timeout, or a link the client refuses to follow.
    Transport,
    /// A response body could not be decoded.
    Decode,
    /// The API answered with an error status.
    Api,
}

/// Rate limit information extracted from response headers.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Maximum requests allowed.
    pub limit: u32,
    /// Remaining requests in current window.
    pub remaining: u32,
    /// Time when the rate limit resets.
    pub reset_at: DateTime<Utc>,
    /// Retry-After header value in seconds (if present).
    pub retry_after: Option<u64>,
    /// Resource category.
    pub resource: Option<String>,
}

/// GitHub API error with detailed information.
#[derive(Error, Debug)]
pub struct GitHubError {
    /// Error kind.
    kind: GitHubErrorKind,
    /// Error message.
    message: String,
    /// HTTP status code.
    status_code: Option<u16>,
    /// GitHub request ID.
    request_id: Option<String>,
    /// Documentation URL.
    documentation_url: Option<String>,
    /// Rate limit info (if applicable).
    rate_limit: Option<RateLimitInfo>,
    /// Underlying cause.
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for GitHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        if let Some(ref id) = self.request_id {
            write!(f, " [request_id: {}]", id)?;
        }
        Ok(())
    }
}

impl GitHubError {
    /// Creates a new GitHub error.
    pub fn new(kind: GitHubErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            request_id: None,
            documentation_url: None,
            rate_limit: None,
            cause: None,
        }
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the GitHub request ID.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Sets the documentation URL.
    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Sets the rate limit info.
    pub fn with_rate_limit(mut self, info: RateLimitInfo) -> Self {
        self.rate_limit = Some(info);
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> &GitHubErrorKind {
        &self.kind
    }

    /// Gets the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the request ID.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Gets the documentation URL.
    pub fn documentation_url(&self) -> Option<&str> {
        self.documentation_url.as_deref()
    }

    /// Gets the rate limit info.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }

    /// Returns the failure class of this error.
    pub fn category(&self) -> ErrorCategory {
        match self.kind {
            GitHubErrorKind::InvalidParameter | GitHubErrorKind::MissingParameter => {
                ErrorCategory::InvalidArgument
            }
            GitHubErrorKind::InvalidBaseUrl | GitHubErrorKind::InvalidConfiguration => {
                ErrorCategory::Configuration
            }
            GitHubErrorKind::ConnectionFailed
            | GitHubErrorKind::Timeout
            | GitHubErrorKind::UntrustedLink => ErrorCategory::Transport,
            GitHubErrorKind::DeserializationError => ErrorCategory::Decode,
            _ => ErrorCategory::Api,
        }
    }

    /// Returns true if no request was sent because an argument was invalid.
    pub fn is_invalid_argument(&self) -> bool {
        self.category() == ErrorCategory::InvalidArgument
    }

    /// Returns true for network-level failures.
    pub fn is_transport(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    /// Returns the retry-after duration in seconds.
    pub fn retry_after(&self) -> Option<u64> {
        let rl = self.rate_limit.as_ref()?;
        rl.retry_after.or_else(|| {
            let now = Utc::now();
            if rl.reset_at > now {
                Some((rl.reset_at - now).num_seconds() as u64)
            } else {
                None
            }
        })
    }

    /// Returns true if retrying the same request could succeed.
    ///
    /// Nothing in this crate retries; the flag is for callers layering their own policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            GitHubErrorKind::PrimaryRateLimitExceeded
                | GitHubErrorKind::SecondaryRateLimitExceeded
                | GitHubErrorKind::ConnectionFailed
                | GitHubErrorKind::Timeout
                | GitHubErrorKind::InternalError
                | GitHubErrorKind::BadGateway
                | GitHubErrorKind::ServiceUnavailable
        )
    }

    /// Creates an error from an HTTP status code and GitHub error response.
    pub fn from_response(
        status: u16,
        message: String,
        documentation_url: Option<String>,
        request_id: Option<String>,
    ) -> Self {
        let kind = Self::kind_from_status(status);
        let mut error = Self::new(kind, message).with_status(status);

        if let Some(url) = documentation_url {
            error = error.with_documentation_url(url);
        }
        if let Some(id) = request_id {
            error = error.with_request_id(id);
        }

        error
    }

    /// Maps HTTP status code to error kind.
    fn kind_from_status(status: u16) -> GitHubErrorKind {
        match status {
            400 => GitHubErrorKind::ValidationError,
            401 => GitHubErrorKind::BadCredentials,
            403 => GitHubErrorKind::Forbidden,
            404 => GitHubErrorKind::NotFound,
            409 => GitHubErrorKind::Conflict,
            410 => GitHubErrorKind::Gone,
            422 => GitHubErrorKind::UnprocessableEntity,
            429 => GitHubErrorKind::SecondaryRateLimitExceeded,
            500 => GitHubErrorKind::InternalError,
            502 => GitHubErrorKind::BadGateway,
            503 => GitHubErrorKind::ServiceUnavailable,
            _ => GitHubErrorKind::Unknown,
        }
    }

    // Convenience constructors

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidConfiguration, message)
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidParameter, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::NotFound, message).with_status(404)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(info: RateLimitInfo) -> Self {
        Self::new(
            GitHubErrorKind::PrimaryRateLimitExceeded,
            "Rate limit exceeded",
        )
        .with_status(403)
        .with_rate_limit(info)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::Timeout, message)
    }

    /// Creates an untrusted link error.
    pub fn untrusted_link(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::UntrustedLink, message)
    }

    /// Creates a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::DeserializationError, message)
    }
}

/// Fails with `MissingParameter` when `value` is empty or whitespace-only.
pub fn ensure_not_empty(value: &str, name: &str) -> GitHubResult<()> {
    if value.trim().is_empty() {
        return Err(GitHubError::new(
            GitHubErrorKind::MissingParameter,
            format!("'{}' must not be empty", name),
        ));
    }
    Ok(())
}

/// Fails with `InvalidParameter` when `value` is zero.
pub fn ensure_positive(value: u32, name: &str) -> GitHubResult<()> {
    if value == 0 {
        return Err(GitHubError::invalid_parameter(format!(
            "'{}' must be greater than zero",
            name
        )));
    }
    Ok(())
}

/// Checks if an error is a rate limit error.
pub fn is_rate_limit_error(error: &GitHubError) -> bool {
    matches!(
        error.kind(),
        GitHubErrorKind::PrimaryRateLimitExceeded | GitHubErrorKind::SecondaryRateLimitExceeded
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_display() {
        let error = GitHubError::new(GitHubErrorKind::NotFound, "Repository not found")
            .with_status(404)
            .with_request_id("abc123");

        let display = format!("{}", error);
        assert!(display.contains("not_found"));
        assert!(display.contains("Repository not found"));
        assert!(display.contains("404"));
        assert!(display.contains("abc123"));
    }

    #[test]
    fn test_is_retryable() {
        let retryable = GitHubError::new(GitHubErrorKind::Timeout, "timeout");
        assert!(retryable.is_retryable());

        let not_retryable = GitHubError::new(GitHubErrorKind::NotFound, "not found");
        assert!(!not_retryable.is_retryable());
    }

    #[test]
    fn test_from_response() {
        let error = GitHubError::from_response(
            404,
            "Not Found".to_string(),
            Some("https://docs.github.com".to_string()),
            Some("req-123".to_string()),
        );

        assert_eq!(*error.kind(), GitHubErrorKind::NotFound);
        assert_eq!(error.status_code(), Some(404));
        assert_eq!(error.documentation_url(), Some("https://docs.github.com"));
        assert_eq!(error.request_id(), Some("req-123"));
        assert_eq!(error.category(), ErrorCategory::Api);
    }

    #[test_case(GitHubErrorKind::MissingParameter, ErrorCategory::InvalidArgument)]
    #[test_case(GitHubErrorKind::InvalidParameter, ErrorCategory::InvalidArgument)]
    #[test_case(GitHubErrorKind::Timeout, ErrorCategory::Transport)]
    #[test_case(GitHubErrorKind::UntrustedLink, ErrorCategory::Transport)]
    #[test_case(GitHubErrorKind::DeserializationError, ErrorCategory::Decode)]
    #[test_case(GitHubErrorKind::InvalidBaseUrl, ErrorCategory::Configuration)]
    #[test_case(GitHubErrorKind::InternalError, ErrorCategory::Api)]
    fn test_category(kind: GitHubErrorKind, expected: ErrorCategory) {
        assert_eq!(GitHubError::new(kind, "x").category(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "spaces")]
    #[test_case("\t\n" ; "control whitespace")]
    fn test_ensure_not_empty_rejects(value: &str) {
        let err = ensure_not_empty(value, "owner").unwrap_err();
        assert_eq!(*err.kind(), GitHubErrorKind::MissingParameter);
        assert!(err.message().contains("owner"));
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive(1, "per_page").is_ok());
        assert!(ensure_positive(0, "per_page").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_retry_after_prefers_header() {
        let info = RateLimitInfo {
            limit: 60,
            remaining: 0,
            reset_at: Utc::now() + chrono::Duration::minutes(10),
            retry_after: Some(5),
            resource: None,
        };
        let error = GitHubError::rate_limited(info);
        assert_eq!(error.retry_after(), Some(5));
        assert_eq!(error.rate_limit().map(|r| r.limit), Some(60));
        assert_eq!(error.status_code(), Some(403));
        assert!(is_rate_limit_error(&error));
    }
}
