//! Subcommand implementations and the setup they share.

pub mod analyze;
pub mod ask;
pub mod cache;
pub mod config;
pub mod types;

use nutri_core::{Config, LlmGateway, ResultCache, WorkerPool};
use std::sync::Arc;

/// Open the image result cache configured in `[cache]`, if enabled.
pub fn open_cache(config: &Config) -> Option<Arc<ResultCache>> {
    if !config.cache.enabled {
        tracing::debug!("Image result cache disabled in config");
        return None;
    }
    Some(Arc::new(ResultCache::open(
        config.cache_path(),
        config.cache.capacity,
    )))
}

/// Build a gateway for the configured provider.
pub fn build_gateway(config: &Config, cache: Option<Arc<ResultCache>>) -> anyhow::Result<LlmGateway> {
    let pool = WorkerPool::new(config.llm.max_concurrent_calls);
    let gateway = LlmGateway::from_config(config, pool, cache).map_err(|e| {
        anyhow::anyhow!("{e}\n\n  Hint: Set the key in your environment or a .env file.")
    })?;
    tracing::debug!(
        provider = gateway.provider_name(),
        model = gateway.model(),
        "Gateway ready"
    );
    Ok(gateway)
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
