//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm.timeout_secs must be > 0".into(),
            ));
        }
        if self.llm.max_concurrent_calls == 0 {
            return Err(ConfigError::ValidationError(
                "llm.max_concurrent_calls must be > 0".into(),
            ));
        }
        if self.cache.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "cache.capacity must be > 0".into(),
            ));
        }
        if self.cache.path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "cache.path must not be empty".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }
        Ok(())
    }
}
