//! Errors from a single completion round-trip
//!
//! Backends only classify what went wrong. Whether to try again is decided
//! by [`crate::completion::CompletionClient`] through [`LlmError::is_retryable`].

use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Wait reported when a 429 carries no usable `retry-after` header
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited by provider (retry after {retry_after:?})")]
    RateLimited { retry_after: Duration },

    #[error("Provider returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Unreadable completion: {0}")]
    InvalidResponse(String),

    #[error("No response within {0:?}")]
    Timeout(Duration),
}

impl LlmError {
    /// Classify a send or body-read failure; timeouts stay distinct
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Network(err)
        }
    }

    /// Classify a failure while reading a success body
    ///
    /// A body that arrived but does not decode is permanent; a body that
    /// never fully arrived is a transport failure.
    pub fn from_body(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_decode() {
            LlmError::InvalidResponse(err.to_string())
        } else {
            Self::from_transport(err, timeout)
        }
    }

    /// Turn a non-success provider response into an error
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER);
            debug!(?retry_after, "from_response: rate limited");
            return LlmError::RateLimited { retry_after };
        }

        let message = response.text().await.unwrap_or_default();
        debug!(%status, "from_response: provider error");
        LlmError::ApiError { status, message }
    }

    /// Transient failures: network, timeout, rate limit, 408 and 5xx
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } | LlmError::Network(_) | LlmError::Timeout(_) => true,
            LlmError::ApiError { status, .. } => *status >= 500 || *status == 408,
            LlmError::InvalidResponse(_) => false,
        }
    }

    /// Provider-suggested wait, reported alongside retries
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// `retry-after` in delay-seconds form; HTTP dates fall back to the default
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
