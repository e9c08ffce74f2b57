//! The normalized result of a gateway call.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Why a gateway call produced no text.
///
/// These are expected failure modes: they travel inside an [`LlmResponse`]
/// instead of being returned as `Err`, so callers can degrade gracefully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    /// The provider did not answer within the deadline.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The provider call failed (network, HTTP status, malformed payload, ...).
    #[error("{message}")]
    ProviderFailure {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },
}

impl ErrorKind {
    pub(crate) fn timeout(deadline: Duration) -> Self {
        ErrorKind::Timeout {
            timeout_ms: deadline.as_millis() as u64,
        }
    }
}

/// Result of one `ask` / `ask_with_image` call.
///
/// Either `text` is present and `error` absent, or the other way round.
/// The constructors are the only way to build one, which keeps that true.
/// `parsed_json` is only ever set alongside `text`; a failed extraction just
/// leaves it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    parsed_json: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ErrorKind>,
}

impl LlmResponse {
    /// A successful call.
    pub fn completed(text: String, tokens: u32, parsed_json: Option<Value>) -> Self {
        Self {
            text: Some(text),
            parsed_json,
            tokens: Some(tokens),
            error: None,
        }
    }

    /// A call that ended in a timeout or provider failure.
    pub fn failed(error: ErrorKind) -> Self {
        Self {
            text: None,
            parsed_json: None,
            tokens: None,
            error: Some(error),
        }
    }

    /// Raw model text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// JSON pulled out of the text, when it was requested and found.
    pub fn parsed_json(&self) -> Option<&Value> {
        self.parsed_json.as_ref()
    }

    /// Token count reported by the provider or estimated from lengths.
    pub fn tokens(&self) -> Option<u32> {
        self.tokens
    }

    /// Error tag for timed-out or failed calls.
    pub fn error(&self) -> Option<&ErrorKind> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Checks the text/error exclusivity. Used to reject tampered cache files.
    pub(crate) fn is_well_formed(&self) -> bool {
        match (&self.text, &self.error) {
            (Some(_), None) => true,
            (None, Some(_)) => self.parsed_json.is_none(),
            _ => false,
        }
    }
}

/// Length-based token estimate: a quarter of the character count of prompt
/// and answer combined.
pub fn estimate_tokens(prompt: &str, text: &str) -> u32 {
    ((prompt.chars().count() + text.chars().count()) / 4) as u32
}
