//! Rate limit accounting shared by every request of a client.
//!
//! The tracker is updated from response headers with atomic stores only, so
//! concurrent fetch chains never contend on a lock.

use crate::errors::RateLimitInfo;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::time::Duration;

/// Parses `x-ratelimit-*` and `retry-after` headers.
///
/// Returns `None` unless limit, remaining and reset are all present.
pub fn extract_rate_limit(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let limit = header_value(headers, "x-ratelimit-limit")?;
    let remaining = header_value(headers, "x-ratelimit-remaining")?;
    let reset_timestamp: i64 = header_value(headers, "x-ratelimit-reset")?;
    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;
    let retry_after = header_value(headers, "retry-after");
    let resource = headers
        .get("x-ratelimit-resource")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    Some(RateLimitInfo {
        limit,
        remaining,
        reset_at,
        retry_after,
        resource,
    })
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Rate limit tracker for GitHub API.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    /// Whether any response carried rate limit headers yet.
    observed: AtomicBool,
    /// Maximum requests allowed.
    limit: AtomicU32,
    /// Remaining requests.
    remaining: AtomicU32,
    /// Reset time (Unix timestamp).
    reset_at: AtomicI64,
}

impl RateLimitTracker {
    /// Creates a tracker that has not seen any response yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the rate limit state reported by a response.
    pub fn update(&self, info: &RateLimitInfo) {
        self.limit.store(info.limit, Ordering::SeqCst);
        self.remaining.store(info.remaining, Ordering::SeqCst);
        self.reset_at
            .store(info.reset_at.timestamp(), Ordering::SeqCst);
        self.observed.store(true, Ordering::SeqCst);
    }

    /// Returns true once a response has reported rate limit headers.
    pub fn is_observed(&self) -> bool {
        self.observed.load(Ordering::SeqCst)
    }

    /// Gets the remaining requests, if known.
    pub fn remaining(&self) -> Option<u32> {
        self.is_observed()
            .then(|| self.remaining.load(Ordering::SeqCst))
    }

    /// Gets the rate limit, if known.
    pub fn limit(&self) -> Option<u32> {
        self.is_observed().then(|| self.limit.load(Ordering::SeqCst))
    }

    /// Gets the reset time, if known.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        if !self.is_observed() {
            return None;
        }
        DateTime::from_timestamp(self.reset_at.load(Ordering::SeqCst), 0)
    }

    /// Time until the window resets when no requests remain.
    pub fn wait_time(&self) -> Option<Duration> {
        if self.remaining()? > 0 {
            return None;
        }

        let reset_at = self.reset_at()?;
        let now = Utc::now();
        if reset_at > now {
            Some((reset_at - now).to_std().unwrap_or(Duration::ZERO))
        } else {
            None
        }
    }
}
