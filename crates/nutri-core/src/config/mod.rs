//! Configuration management for nutri.
//!
//! Configuration is loaded from the platform config directory (falling back
//! to `~/.nutri/config.toml`). Every section has defaults, so a missing file
//! or a partial one is fine.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure for nutri.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider and gateway settings
    pub llm: LlmConfig,

    /// Image result cache settings
    pub cache: CacheConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.nutri.nutri/config.toml
    /// - Linux: ~/.config/nutri/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\nutri\config\config.toml
    ///
    /// Falls back to ~/.nutri/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "nutri", "nutri")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".nutri").join("config.toml")
            })
    }

    /// Resolved cache file path (with ~ expansion).
    pub fn cache_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.cache.path);
        PathBuf::from(expanded.into_owned())
    }

    /// Default per-call deadline.
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
