//! LLM request/response core.
//!
//! Provides a provider abstraction over the supported backends (OpenAI,
//! DeepSeek, Ollama), a deadline-bounded gateway that normalizes every call
//! into an [`LlmResponse`], a shared worker pool, a persistent FIFO cache for
//! image answers, and a tolerant JSON extractor for model output.

pub mod cache;
pub(crate) mod deepseek;
pub mod extract;
pub mod gateway;
pub(crate) mod ollama;
pub(crate) mod openai;
pub mod pool;
pub mod provider;
pub mod response;
pub mod retry;

pub use cache::{CacheStats, ResultCache};
pub use extract::extract_json;
pub use gateway::{AskOptions, ImageOptions, LlmGateway};
pub use pool::{PoolError, WorkerPool};
pub use provider::{Completion, ImageInput, LlmProvider, ProviderError, ProviderFactory};
pub use response::{estimate_tokens, ErrorKind, LlmResponse};
pub use retry::{backoff_duration, is_retryable};
