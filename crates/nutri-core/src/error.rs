//! Error types for the nutri LLM core.
//!
//! Two categories are kept apart on purpose:
//! - failures that are *returned as data* inside an [`LlmResponse`](crate::llm::LlmResponse)
//!   (timeouts, provider failures, see [`ErrorKind`](crate::llm::ErrorKind)), and
//! - failures that are *propagated* as `Err` (bad configuration, unsupported
//!   capability, unreadable image), defined here.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for nutri operations.
#[derive(Error, Debug)]
pub enum NutriError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Gateway call errors that are not encoded in the response
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors. Raised at construction time only.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The requested provider kind has no backend implementation
    #[error("Unsupported LLM provider: {0}")]
    UnknownProvider(String),

    /// A provider that needs credentials was configured without them
    #[error("{provider} API key not set. Set {env_var} env var.")]
    MissingCredentials { provider: String, env_var: String },
}

/// Per-call errors that propagate out of the gateway instead of being
/// returned inside a response.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The active provider cannot perform the requested operation
    #[error("{operation} is not supported by the {provider} provider")]
    Unsupported {
        provider: String,
        operation: &'static str,
    },

    /// The image to analyze could not be read from disk
    #[error("Failed to read image {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image path cannot serve as a cache key
    #[error("Image path is not valid UTF-8: {}", .0.display())]
    InvalidPath(PathBuf),
}

/// Convenience type alias for nutri results.
pub type Result<T> = std::result::Result<T, NutriError>;

/// Convenience type alias for gateway results.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
