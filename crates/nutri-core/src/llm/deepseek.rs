//! DeepSeek provider (OpenAI-compatible API, text only).
//!
//! DeepSeek speaks the Chat Completions format, so this delegates to a
//! text-only `OpenAiProvider` pointed at the DeepSeek endpoint.

use super::openai::OpenAiProvider;
use super::provider::{Completion, LlmProvider, ProviderError};
use crate::config::ExtraParams;
use async_trait::async_trait;

/// DeepSeek provider wrapping an OpenAI-compatible endpoint.
pub struct DeepSeekProvider {
    inner: OpenAiProvider,
}

impl DeepSeekProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str, extra: ExtraParams) -> Self {
        let url = format!("{}/chat/completions", endpoint.trim_end_matches('/'));
        Self {
            inner: OpenAiProvider::text_only("deepseek", api_key, model, &url, extra),
        }
    }
}

#[async_trait]
impl LlmProvider for DeepSeekProvider {
    fn name(&self) -> &str {
        "deepseek"
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn complete_text(&self, prompt: &str) -> Result<Completion, ProviderError> {
        self.inner.complete_text(prompt).await
    }
}
