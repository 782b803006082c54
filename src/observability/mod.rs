//! Observability: structured tracing events and request/page metrics.

use crate::errors::RateLimitInfo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Metrics collector for GitHub API operations.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total requests made.
    requests_total: AtomicU64,
    /// Successful requests.
    requests_success: AtomicU64,
    /// Failed requests.
    requests_failed: AtomicU64,
    /// Pages decoded by fetch chains.
    pages_fetched: AtomicU64,
    /// Total request latency in microseconds.
    latency_total_us: AtomicU64,
    /// Request count for latency calculation.
    latency_count: AtomicU64,
}

impl Metrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request.
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful request.
    pub fn record_success(&self) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed request.
    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a decoded page.
    pub fn record_page(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Records request latency.
    pub fn record_latency(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.latency_total_us.fetch_add(us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the total request count.
    pub fn total_requests(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    /// Gets the successful request count.
    pub fn successful_requests(&self) -> u64 {
        self.requests_success.load(Ordering::Relaxed)
    }

    /// Gets the failed request count.
    pub fn failed_requests(&self) -> u64 {
        self.requests_failed.load(Ordering::Relaxed)
    }

    /// Gets the number of pages fetched.
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    /// Gets the average latency in microseconds.
    pub fn average_latency_us(&self) -> u64 {
        let total = self.latency_total_us.load(Ordering::Relaxed);
        let count = self.latency_count.load(Ordering::Relaxed);
        if count == 0 {
            0
        } else {
            total / count
        }
    }

    /// Gets a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.total_requests(),
            requests_success: self.successful_requests(),
            requests_failed: self.failed_requests(),
            pages_fetched: self.pages_fetched(),
            average_latency_us: self.average_latency_us(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total requests.
    pub requests_total: u64,
    /// Successful requests.
    pub requests_success: u64,
    /// Failed requests.
    pub requests_failed: u64,
    /// Pages fetched.
    pub pages_fetched: u64,
    /// Average latency in microseconds.
    pub average_latency_us: u64,
}

/// Request timer for measuring latency.
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<Metrics>,
}

impl RequestTimer {
    /// Creates a new request timer.
    pub fn new(metrics: Arc<Metrics>) -> Self {
        metrics.record_request();
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    /// Records success and latency.
    pub fn success(self) -> Duration {
        let elapsed = self.start.elapsed();
        self.metrics.record_success();
        self.metrics.record_latency(elapsed);
        elapsed
    }

    /// Records failure and latency.
    pub fn failure(self) -> Duration {
        let elapsed = self.start.elapsed();
        self.metrics.record_failure();
        self.metrics.record_latency(elapsed);
        elapsed
    }
}

/// Tracing hooks for GitHub API operations.
pub struct TracingHooks;

impl TracingHooks {
    /// Logs the start of an API request.
    #[instrument(skip(method, url, headers))]
    pub fn on_request_start(method: &str, url: &str, headers: &[(String, String)]) {
        debug!(
            method = %method,
            url = %url,
            headers = ?headers,
            "GitHub API request started"
        );
    }

    /// Logs the completion of an API request.
    #[instrument(skip(method, url, status, duration))]
    pub fn on_request_complete(method: &str, url: &str, status: u16, duration: Duration) {
        debug!(
            method = %method,
            url = %url,
            status = status,
            duration_ms = duration.as_millis() as u64,
            "GitHub API request completed"
        );
    }

    /// Logs a request error.
    #[instrument(skip(method, url, error))]
    pub fn on_request_error(method: &str, url: &str, error: &str) {
        warn!(
            method = %method,
            url = %url,
            error = %error,
            "GitHub API request failed"
        );
    }

    /// Logs rate limit info.
    #[instrument(skip(info))]
    pub fn on_rate_limit_update(info: &RateLimitInfo) {
        debug!(
            limit = info.limit,
            remaining = info.remaining,
            reset_at = %info.reset_at,
            resource = info.resource.as_deref().unwrap_or("core"),
            "Rate limit updated"
        );
    }

    /// Logs a page handed to a fetch chain.
    pub fn on_page_fetched(url: &str, page_index: u32, items: usize, has_next: bool) {
        debug!(
            url = %url,
            page_index = page_index,
            items = items,
            has_next = has_next,
            "Page fetched"
        );
    }

    /// Logs a chain stopped by its page-count bound while a next link existed.
    pub fn on_window_exhausted(max_pages: u32) {
        debug!(max_pages = max_pages, "Page limit reached, not following next link");
    }

    /// Logs a subscription cancelled by its consumer.
    pub fn on_subscription_cancelled(items_emitted: u64) {
        debug!(items_emitted = items_emitted, "Subscription cancelled");
    }
}

/// Sensitive headers that should be redacted in logs.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "x-github-token",
    "x-access-token",
    "cookie",
    "set-cookie",
];

/// Redacts sensitive values in headers.
pub fn redact_header(name: &str, value: &str) -> String {
    if SENSITIVE_HEADERS.contains(&name.to_lowercase().as_str()) {
        "[REDACTED]".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.record_request();
        metrics.record_success();
        metrics.record_latency(Duration::from_millis(100));

        assert_eq!(metrics.total_requests(), 1);
        assert_eq!(metrics.successful_requests(), 1);
        assert_eq!(metrics.failed_requests(), 0);
        assert!(metrics.average_latency_us() >= 100_000);
    }

    #[test]
    fn test_metrics_snapshot() {
        let metrics = Arc::new(Metrics::new());

        RequestTimer::new(metrics.clone()).success();
        RequestTimer::new(metrics.clone()).failure();
        metrics.record_page();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.requests_success, 1);
        assert_eq!(snapshot.requests_failed, 1);
        assert_eq!(snapshot.pages_fetched, 1);
    }

    #[test]
    fn test_redact_header() {
        assert_eq!(redact_header("Authorization", "Bearer token"), "[REDACTED]");
        assert_eq!(redact_header("Content-Type", "application/json"), "application/json");
    }
}
