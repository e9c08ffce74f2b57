//! Caller-side retry helpers.
//!
//! The gateway never retries on its own. Callers that want to can classify
//! the returned [`ErrorKind`] and back off between attempts.

use super::response::ErrorKind;
use std::time::Duration;

/// Determine whether a failed call is worth retrying.
///
/// Retryable: timeouts, rate limits (429), server errors (5xx), connection
/// failures. Not retryable: auth failures, bad requests, missing models.
pub fn is_retryable(error: &ErrorKind) -> bool {
    match error {
        ErrorKind::Timeout { .. } => true,
        ErrorKind::ProviderFailure {
            status_code,
            message,
        } => {
            if let Some(code) = status_code {
                return *code == 429 || (500..=599).contains(code);
            }
            // No HTTP status: connection refused, DNS failure, ...
            message.contains("timed out") || message.contains("connect")
        }
    }
}

/// Exponential backoff: `base_delay * 2^attempt`, capped at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}
