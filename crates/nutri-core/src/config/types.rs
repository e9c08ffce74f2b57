//! Sub-configuration structs with their defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Extra request parameters merged into every provider request body
/// (e.g. `temperature`, `max_tokens`).
pub type ExtraParams = serde_json::Map<String, serde_json::Value>;

/// The backends the gateway knows how to talk to.
///
/// Names are matched case-insensitively when loading config; anything else
/// is rejected with [`ConfigError::UnknownProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ProviderKind {
    /// OpenAI Chat Completions (text and vision)
    #[default]
    OpenAi,
    /// DeepSeek Chat Completions (text only)
    DeepSeek,
    /// Local Ollama instance (text and vision)
    Ollama,
}

impl ProviderKind {
    /// Identifier used in config files and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            "ollama" => Ok(ProviderKind::Ollama),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// LLM gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Active provider
    pub provider: ProviderKind,

    /// Model override applied on top of the provider's own default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Default per-call deadline in seconds
    pub timeout_secs: u64,

    /// Maximum provider calls in flight across every gateway sharing a pool
    pub max_concurrent_calls: usize,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,

    /// DeepSeek configuration
    pub deepseek: Option<DeepSeekConfig>,

    /// Ollama (local) configuration
    pub ollama: Option<OllamaConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: None,
            timeout_secs: 20,
            max_concurrent_calls: 16,
            openai: None,
            deepseek: None,
            ollama: None,
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model used for text prompts
    pub model: String,

    /// Model used for image prompts
    pub vision_model: String,

    /// Chat Completions endpoint
    pub endpoint: String,

    /// Additional request body parameters
    pub extra: ExtraParams,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            vision_model: "gpt-4o".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            extra: ExtraParams::new(),
        }
    }
}

/// DeepSeek configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepSeekConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,

    /// OpenAI-compatible endpoint base
    pub endpoint: String,

    /// Additional request body parameters
    pub extra: ExtraParams,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: "${DEEPSEEK_API_KEY}".to_string(),
            model: "deepseek-chat".to_string(),
            endpoint: "https://api.deepseek.com".to_string(),
            extra: ExtraParams::new(),
        }
    }
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Additional generation options
    pub extra: ExtraParams,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2-vision".to_string(),
            extra: ExtraParams::new(),
        }
    }
}

/// Image result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether image analyses are cached at all
    pub enabled: bool,

    /// Maximum number of cached responses
    pub capacity: usize,

    /// Backing file
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 100,
            path: "~/.nutri/cache/image_llm_cache.json".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
