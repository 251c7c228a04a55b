//! Capped exponential backoff around provider requests.
//!
//! Retried: timeouts, connection failures, 408, 429 and 5xx.
//! Everything else (including 401 for a bad key and 404 for an unknown city)
//! surfaces on the first attempt.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 200;
pub const DEFAULT_MAX_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts after the first one. Zero disables retrying.
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt + 1`: initial * 2^attempt, capped.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay_ms = self.initial_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    NoRetry,
}

pub fn classify_error(error: &reqwest::Error) -> RetryDecision {
    if error.is_timeout() || error.is_connect() {
        return RetryDecision::Retry;
    }
    match error.status() {
        Some(status) => classify_status(status),
        None => RetryDecision::NoRetry,
    }
}

pub fn classify_status(status: StatusCode) -> RetryDecision {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        RetryDecision::Retry
    } else {
        RetryDecision::NoRetry
    }
}

/// Runs `operation` until it yields a non-retryable outcome or the retry
/// budget is spent. The last response or error is returned as-is.
pub async fn with_retry<F, Fut>(config: &RetryConfig, operation: F) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 0;

    loop {
        let outcome = operation().await;
        let decision = match &outcome {
            Ok(response) => classify_status(response.status()),
            Err(error) => classify_error(error),
        };

        if decision == RetryDecision::NoRetry || attempt >= config.max_retries {
            if attempt > 0 {
                tracing::debug!(retries = attempt, "giving up retrying");
            }
            return outcome;
        }

        let delay = config.delay_for_attempt(attempt);
        match &outcome {
            Ok(response) => tracing::warn!(
                status = %response.status(),
                attempt = attempt + 1,
                ?delay,
                "retryable status from provider"
            ),
            Err(error) => tracing::warn!(
                %error,
                attempt = attempt + 1,
                ?delay,
                "retryable transport error"
            ),
        }

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(200));
        assert_eq!(RetryConfig::disabled().max_retries, 0);
    }

    #[test]
    fn delay_doubles_then_caps() {
        let config = RetryConfig {
            max_retries: 10,
            initial_delay_ms: 100,
            max_delay_ms: 1000,
        };
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(800));
        assert_eq!(config.delay_for_attempt(4), Duration::from_millis(1000));
        assert_eq!(config.delay_for_attempt(63), Duration::from_millis(1000));
    }

    #[test]
    fn only_transient_statuses_retry() {
        assert_eq!(classify_status(StatusCode::INTERNAL_SERVER_ERROR), RetryDecision::Retry);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), RetryDecision::Retry);
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS), RetryDecision::Retry);
        assert_eq!(classify_status(StatusCode::REQUEST_TIMEOUT), RetryDecision::Retry);

        assert_eq!(classify_status(StatusCode::NOT_FOUND), RetryDecision::NoRetry);
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), RetryDecision::NoRetry);
        assert_eq!(classify_status(StatusCode::OK), RetryDecision::NoRetry);
    }
}
