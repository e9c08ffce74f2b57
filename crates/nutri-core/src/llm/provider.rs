//! LLM provider trait and the types that cross it.
//!
//! Defines the interface every backend implements, plus the factory that
//! builds the right adapter from config.

use crate::config::{ExtraParams, LlmConfig, ProviderKind};
use crate::error::ConfigError;
use async_trait::async_trait;
use base64::Engine;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Encode raw bytes with the given MIME type.
    pub fn from_bytes(bytes: &[u8], media_type: &str) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Raw output of a provider call, before normalization.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text
    pub text: String,
    /// Total tokens (input + output), if the provider reported it
    pub total_tokens: Option<u32>,
}

/// A failed provider call.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
    /// HTTP status, when the failure came from a response
    pub status_code: Option<u16>,
    /// Set when the provider cannot perform the operation at all
    unsupported: bool,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            unsupported: false,
        }
    }

    pub fn http(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code: Some(status_code),
            unsupported: false,
        }
    }

    /// The provider does not implement `operation`.
    pub fn unsupported(provider: &str, operation: &str) -> Self {
        Self {
            message: format!("{operation} is not supported by the {provider} provider"),
            status_code: None,
            unsupported: true,
        }
    }

    /// True for capability errors, as opposed to failed requests.
    pub fn is_unsupported(&self) -> bool {
        self.unsupported
    }
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the gateway holds an `Arc<dyn LlmProvider>`).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Model used for text prompts.
    fn model(&self) -> &str;

    /// Whether `complete_vision` is implemented.
    fn supports_vision(&self) -> bool {
        false
    }

    /// Complete a text prompt.
    async fn complete_text(&self, prompt: &str) -> Result<Completion, ProviderError>;

    /// Complete a prompt about an image. Text-only providers keep the default.
    async fn complete_vision(
        &self,
        _prompt: &str,
        _image: &ImageInput,
    ) -> Result<Completion, ProviderError> {
        Err(ProviderError::unsupported(self.name(), "complete_vision"))
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Copy `extra` into a serialized request body without clobbering keys the
/// adapter already set.
pub(crate) fn merge_extra(body: &mut serde_json::Value, extra: &ExtraParams) {
    if let Some(map) = body.as_object_mut() {
        for (key, value) in extra {
            map.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}

/// Factory that creates the configured provider.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the provider selected by `config.provider`.
    ///
    /// `config.model` overrides the provider's own text model. Fails when the
    /// provider needs an API key and none resolves.
    pub fn create(config: &LlmConfig) -> Result<Box<dyn LlmProvider>, ConfigError> {
        let model_override = config.model.as_deref();
        match config.provider {
            ProviderKind::OpenAi => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key = require_key(&cfg.api_key, "OpenAI", "OPENAI_API_KEY")?;
                let model = model_override.unwrap_or(&cfg.model).to_string();
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &api_key,
                    &model,
                    &cfg.vision_model,
                    &cfg.endpoint,
                    cfg.extra.clone(),
                )))
            }
            ProviderKind::DeepSeek => {
                let cfg = config.deepseek.clone().unwrap_or_default();
                let api_key = require_key(&cfg.api_key, "DeepSeek", "DEEPSEEK_API_KEY")?;
                let model = model_override.unwrap_or(&cfg.model).to_string();
                Ok(Box::new(super::deepseek::DeepSeekProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &model,
                    cfg.extra.clone(),
                )))
            }
            ProviderKind::Ollama => {
                let cfg = config.ollama.clone().unwrap_or_default();
                let model = model_override.unwrap_or(&cfg.model).to_string();
                Ok(Box::new(super::ollama::OllamaProvider::new(
                    &cfg.endpoint,
                    &model,
                    cfg.extra.clone(),
                )))
            }
        }
    }
}

fn require_key(raw: &str, provider: &str, env_var: &str) -> Result<String, ConfigError> {
    resolve_env_var(raw).ok_or_else(|| ConfigError::MissingCredentials {
        provider: provider.to_string(),
        env_var: env_var.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeepSeekConfig, OpenAiConfig};
    use serde_json::json;

    #[test]
    fn test_image_input_from_bytes() {
        let input = ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "image/jpeg");
        assert_eq!(input.media_type, "image/jpeg");
        assert_eq!(input.data, "/9j/");
    }

    #[test]
    fn test_image_input_data_url() {
        let input = ImageInput::from_bytes(&[1, 2, 3], "image/png");
        let url = input.data_url();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_merge_extra_keeps_core_fields() {
        let mut body = json!({"model": "gpt-4o", "messages": []});
        let mut extra = ExtraParams::new();
        extra.insert("model".into(), json!("something-else"));
        extra.insert("temperature".into(), json!(0.1));
        merge_extra(&mut body, &extra);
        assert_eq!(body["model"], json!("gpt-4o"));
        assert_eq!(body["temperature"], json!(0.1));
    }

    #[test]
    fn test_factory_missing_key() {
        let config = LlmConfig {
            provider: ProviderKind::OpenAi,
            openai: Some(OpenAiConfig {
                api_key: "${NUTRI_TEST_UNSET_OPENAI_KEY}".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = ProviderFactory::create(&config).err().unwrap();
        assert!(matches!(err, ConfigError::MissingCredentials { .. }));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_factory_builds_each_kind() {
        let config = LlmConfig {
            provider: ProviderKind::OpenAi,
            openai: Some(OpenAiConfig {
                api_key: "sk-test".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let provider = ProviderFactory::create(&config).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-3.5-turbo");
        assert!(provider.supports_vision());

        let config = LlmConfig {
            provider: ProviderKind::DeepSeek,
            model: Some("deepseek-reasoner".into()),
            deepseek: Some(DeepSeekConfig {
                api_key: "sk-test".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let provider = ProviderFactory::create(&config).unwrap();
        assert_eq!(provider.name(), "deepseek");
        assert_eq!(provider.model(), "deepseek-reasoner");
        assert!(!provider.supports_vision());

        let config = LlmConfig {
            provider: ProviderKind::Ollama,
            ..Default::default()
        };
        let provider = ProviderFactory::create(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert!(provider.supports_vision());
    }

    #[tokio::test]
    async fn test_text_only_provider_rejects_vision_call() {
        let provider = crate::llm::deepseek::DeepSeekProvider::new(
            "https://api.deepseek.com",
            "sk-test",
            "deepseek-chat",
            ExtraParams::new(),
        );
        let image = ImageInput::from_bytes(&[0xFF, 0xD8], "image/jpeg");
        let err = provider.complete_vision("dish?", &image).await.unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(err.status_code, None);
        assert_eq!(
            err.to_string(),
            "complete_vision is not supported by the deepseek provider"
        );
    }

    #[test]
    fn test_request_errors_are_not_capability_errors() {
        assert!(!ProviderError::new("connection refused").is_unsupported());
        assert!(!ProviderError::http("HTTP 503", 503).is_unsupported());
    }
}
