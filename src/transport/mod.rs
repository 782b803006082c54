//! HTTP transport layer.
//!
//! The client never talks to `reqwest` directly; every request goes through
//! [`HttpTransport`], which keeps the paging core testable against in-memory
//! transports.

use crate::config::GitHubConfig;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::HeaderMap, Client, Method};
use std::time::Duration;
use url::Url;

/// HTTP transport abstraction for testability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends one request and returns the raw response, whatever its status.
    ///
    /// Only network-level failures are errors here.
    async fn send(&self, request: HttpRequest) -> GitHubResult<HttpResponse>;
}

/// HTTP request representation.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL, query included.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Creates a GET request.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            timeout: None,
        }
    }
}

/// HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Gets a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Transport backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Creates a transport using the timeouts and pool settings of `config`.
    pub fn new(config: &GitHubConfig) -> GitHubResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool.max_idle_per_host)
            .pool_idle_timeout(config.pool.idle_timeout)
            .build()
            .map_err(|e| {
                GitHubError::new(
                    GitHubErrorKind::InvalidConfiguration,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> GitHubResult<HttpResponse> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GitHubError::timeout(format!("Request timed out: {}", e)).with_cause(e)
            } else if e.is_connect() {
                GitHubError::new(
                    GitHubErrorKind::ConnectionFailed,
                    format!("Connection failed: {}", e),
                )
                .with_cause(e)
            } else {
                GitHubError::new(
                    GitHubErrorKind::ConnectionFailed,
                    format!("Request failed: {}", e),
                )
                .with_cause(e)
            }
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                GitHubError::timeout(format!("Timed out reading response body: {}", e))
            } else {
                GitHubError::new(
                    GitHubErrorKind::ConnectionFailed,
                    format!("Failed to read response body: {}", e),
                )
            }
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_response_helpers() {
        let mut headers = HeaderMap::new();
        headers.insert("etag", HeaderValue::from_static("\"abc\""));
        let response = HttpResponse {
            status: 204,
            headers,
            body: Bytes::new(),
        };

        assert!(response.is_success());
        assert_eq!(response.header("etag"), Some("\"abc\""));
        assert_eq!(response.header("link"), None);
    }

    #[test]
    fn test_get_request_defaults() {
        let url = Url::parse("https://api.github.com/user").unwrap();
        let request = HttpRequest::get(url.clone());
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, url);
        assert!(request.headers.is_empty());
        assert!(request.timeout.is_none());
    }

    #[test]
    fn test_reqwest_transport_builds_from_default_config() {
        assert!(ReqwestTransport::new(&GitHubConfig::default()).is_ok());
    }
}
