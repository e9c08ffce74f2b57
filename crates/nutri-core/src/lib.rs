//! Nutri Core - LLM request/response core for a nutrition-tracking backend.
//!
//! Sends prompts (optionally with a meal photo) to a configured LLM provider
//! and always returns a normalized [`LlmResponse`](llm::LlmResponse): text,
//! token count and optionally extracted JSON on success, or an error tag on
//! timeout and provider failure.
//!
//! # Architecture
//!
//! ```text
//! caller → LlmGateway ─┬─ ResultCache (image answers, FIFO, on disk)
//!                      └─ WorkerPool (bounded, per-call deadline) → LlmProvider
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use nutri_core::{AskOptions, Config, LlmGateway, WorkerPool};
//!
//! #[tokio::main]
//! async fn main() -> nutri_core::Result<()> {
//!     let config = Config::load()?;
//!     let pool = WorkerPool::new(config.llm.max_concurrent_calls);
//!     let gateway = LlmGateway::from_config(&config, pool, None)?;
//!
//!     let resp = gateway.ask("Daily protein target for 70kg?", AskOptions::json()).await;
//!     println!("{:?}", resp.parsed_json());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod meal;

pub use config::Config;
pub use error::{ConfigError, GatewayError, GatewayResult, NutriError, Result};
pub use llm::{
    AskOptions, ErrorKind, ImageOptions, LlmGateway, LlmResponse, ResultCache, WorkerPool,
};
pub use meal::{analyze_dish, compute_health_score, DishAnalysis};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
