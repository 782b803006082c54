//! Token authentication for GitHub API requests.

use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use secrecy::{ExposeSecret, SecretString};

/// Environment variable read by [`AuthMethod::from_env`].
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Authentication method for GitHub API.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Personal Access Token (classic or fine-grained).
    Pat(SecretString),
    /// OAuth access token.
    OAuth(SecretString),
    /// GitHub Actions token (from GITHUB_TOKEN).
    Actions(SecretString),
}

impl AuthMethod {
    /// Creates a PAT authentication method.
    pub fn pat(token: impl Into<String>) -> Self {
        Self::Pat(SecretString::new(token.into()))
    }

    /// Creates an OAuth authentication method.
    pub fn oauth(token: impl Into<String>) -> Self {
        Self::OAuth(SecretString::new(token.into()))
    }

    /// Creates a GitHub Actions token authentication method.
    pub fn actions(token: impl Into<String>) -> Self {
        Self::Actions(SecretString::new(token.into()))
    }

    /// Reads a token from `GITHUB_TOKEN`.
    ///
    /// Inside a GitHub Actions job (`GITHUB_ACTIONS=true`) the token is tagged
    /// as an Actions token, otherwise it is treated as a PAT.
    pub fn from_env() -> GitHubResult<Self> {
        Self::from_env_var(GITHUB_TOKEN_VAR)
    }

    /// Reads a token from a custom environment variable.
    pub fn from_env_var(var_name: &str) -> GitHubResult<Self> {
        let token = std::env::var(var_name).map_err(|_| {
            GitHubError::new(
                GitHubErrorKind::InvalidConfiguration,
                format!("Environment variable {} not set", var_name),
            )
        })?;

        if token.trim().is_empty() {
            return Err(GitHubError::configuration(format!(
                "Environment variable {} is empty",
                var_name
            )));
        }

        if matches!(std::env::var("GITHUB_ACTIONS").as_deref(), Ok("true")) {
            Ok(Self::actions(token))
        } else {
            Ok(Self::pat(token))
        }
    }

    /// Gets the token prefix for logging.
    pub fn token_prefix(&self) -> &'static str {
        match self {
            Self::Pat(t) => {
                let exposed = t.expose_secret();
                if exposed.starts_with("ghp_") {
                    "ghp_***"
                } else if exposed.starts_with("github_pat_") {
                    "github_pat_***"
                } else {
                    "***"
                }
            }
            Self::OAuth(_) => "gho_***",
            Self::Actions(_) => "ghs_***",
        }
    }

    fn secret(&self) -> &SecretString {
        match self {
            Self::Pat(t) | Self::OAuth(t) | Self::Actions(t) => t,
        }
    }
}

/// Produces the `Authorization` header for every request of a client.
#[derive(Debug)]
pub struct AuthManager {
    method: AuthMethod,
}

impl AuthManager {
    /// Creates a new authentication manager.
    pub fn new(method: AuthMethod) -> Self {
        Self { method }
    }

    /// Gets the authentication method.
    pub fn method(&self) -> &AuthMethod {
        &self.method
    }

    /// Generates the Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.method.secret().expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pat_auth() {
        let auth = AuthMethod::pat("ghp_xxxxxxxxxxxx");
        assert_eq!(auth.token_prefix(), "ghp_***");

        let fine_grained = AuthMethod::pat("github_pat_xxxx");
        assert_eq!(fine_grained.token_prefix(), "github_pat_***");
    }

    #[test]
    fn test_oauth_auth() {
        let auth = AuthMethod::oauth("gho_xxxxxxxxxxxx");
        assert_eq!(auth.token_prefix(), "gho_***");
    }

    #[test]
    fn test_auth_manager_header() {
        let manager = AuthManager::new(AuthMethod::actions("ghs_test"));
        assert_eq!(manager.authorization_header(), "Bearer ghs_test");
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let auth = AuthMethod::pat("ghp_supersecret");
        assert!(!format!("{:?}", auth).contains("supersecret"));
    }

    #[test]
    fn test_missing_env_var() {
        let err = AuthMethod::from_env_var("INTEGRATIONS_GITHUB_TEST_UNSET_VAR").unwrap_err();
        assert_eq!(*err.kind(), GitHubErrorKind::InvalidConfiguration);
    }
}
