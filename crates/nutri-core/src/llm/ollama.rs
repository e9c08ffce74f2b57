//! Ollama provider for local model inference.
//!
//! Talks to a local Ollama instance via its HTTP API.
//! No authentication required, just needs Ollama running locally.

use super::provider::{merge_extra, Completion, ImageInput, LlmProvider, ProviderError};
use crate::config::ExtraParams;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Ollama provider for local text and vision inference.
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    extra: ExtraParams,
}

impl OllamaProvider {
    pub fn new(endpoint: &str, model: &str, extra: ExtraParams) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            extra,
        }
    }

    fn build_body(&self, prompt: &str, images: Vec<String>) -> serde_json::Value {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            images,
            stream: false,
        };
        let mut body = serde_json::to_value(&request).unwrap_or_default();
        if !self.extra.is_empty() {
            let mut options = serde_json::json!({});
            merge_extra(&mut options, &self.extra);
            body["options"] = options;
        }
        body
    }

    async fn generate(&self, body: &serde_json::Value) -> Result<Completion, ProviderError> {
        let url = format!("{}/api/generate", self.endpoint);

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::new(format!("Ollama request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::http(
                format!("Ollama HTTP {status}: {text}"),
                status.as_u16(),
            ));
        }

        let ollama_resp: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::new(format!("Failed to parse Ollama response: {e}")))?;

        if ollama_resp.response.trim().is_empty() {
            return Err(ProviderError::new(
                "Ollama returned empty response, no content generated",
            ));
        }

        Ok(ollama_resp.into_completion())
    }
}

/// Ollama /api/generate request body.
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    stream: bool,
}

/// Ollama /api/generate response.
#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

impl OllamaResponse {
    fn into_completion(self) -> Completion {
        let total_tokens = match (self.prompt_eval_count, self.eval_count) {
            (Some(p), Some(e)) => Some(p + e),
            _ => None,
        };
        Completion {
            text: self.response,
            total_tokens,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn supports_vision(&self) -> bool {
        true
    }

    async fn complete_text(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let body = self.build_body(prompt, Vec::new());
        self.generate(&body).await
    }

    async fn complete_vision(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<Completion, ProviderError> {
        let body = self.build_body(prompt, vec![image.data.clone()]);
        self.generate(&body).await
    }
}
