//! GitHub rate-limit headers.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::Serialize;

/// Rate-limit state reported by GitHub on every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateInfo {
    pub limit: u64,
    pub remaining: u64,
    pub reset: Option<DateTime<Utc>>,
}

impl RateInfo {
    /// Read `x-ratelimit-*` headers. Returns `None` unless both limit and
    /// remaining are present.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = header_number(headers, "x-ratelimit-limit")?;
        let remaining = header_number(headers, "x-ratelimit-remaining")?;
        let reset = header_number(headers, "x-ratelimit-reset")
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        Some(Self {
            limit,
            remaining,
            reset,
        })
    }
}

impl fmt::Display for RateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "limit: {}, remaining: {}", self.limit, self.remaining)
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}
