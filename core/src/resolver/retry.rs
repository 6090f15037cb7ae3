//! Retry timing for the HTTP link resolver.

use crate::config::RetryOptions;
use httpdate::parse_http_date;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::{Duration, SystemTime};

/// Longest `Retry-After` delay the resolver will honour.
pub const MAX_SERVER_HINT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_retries: u32,
}

impl From<&RetryOptions> for RetryPolicy {
    fn from(options: &RetryOptions) -> Self {
        Self {
            base_delay: Duration::from_millis(options.base_delay_ms),
            max_delay: Duration::from_millis(options.max_delay_ms),
            max_retries: options.max_retries,
        }
    }
}

/// How one attempt at a batch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    Status {
        status: StatusCode,
        retry_after: Option<Duration>,
    },
    Network,
}

impl AttemptFailure {
    fn is_transient(&self) -> bool {
        match self {
            AttemptFailure::Status { status, .. } => {
                matches!(
                    *status,
                    StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
                ) || status.is_server_error()
            }
            AttemptFailure::Network => true,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt, or `None` when the failure is final.
    ///
    /// `retries_done` counts the retries already made. A server hint replaces
    /// the exponential backoff; both are capped at `max_delay`.
    pub fn next_delay(&self, failure: AttemptFailure, retries_done: u32) -> Option<Duration> {
        if retries_done >= self.max_retries || !failure.is_transient() {
            return None;
        }

        let delay = match failure {
            AttemptFailure::Status {
                retry_after: Some(hint),
                ..
            } => hint,
            _ => self
                .base_delay
                .saturating_mul(2u32.saturating_pow(retries_done)),
        };
        Some(delay.min(self.max_delay))
    }
}

/// Reads `Retry-After` (delta seconds or HTTP date) relative to `now`.
pub fn retry_after(headers: &HeaderMap, now: SystemTime) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let delay = match value.parse::<u64>() {
        Ok(seconds) => Duration::from_secs(seconds),
        Err(_) => parse_http_date(value)
            .ok()?
            .duration_since(now)
            .unwrap_or_default(),
    };
    Some(delay.min(MAX_SERVER_HINT_WINDOW))
}
