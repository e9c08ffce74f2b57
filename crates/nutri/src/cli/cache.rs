//! The `nutri cache` command for the image result cache.

use clap::{Args, Subcommand};
use nutri_core::{Config, ResultCache};

/// Arguments for the `cache` command.
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Subcommands for cache management.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Show entry count and capacity
    Stats,

    /// List cached image paths, oldest first
    List,

    /// Remove every cached response
    Clear,

    /// Show cache file path
    Path,
}

/// Execute the cache command.
pub async fn execute(args: CacheArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let path = config.cache_path();

    match args.command {
        CacheCommand::Stats => {
            let cache = ResultCache::open(&path, config.cache.capacity);
            super::print_json(&cache.stats().await)?;
        }

        CacheCommand::List => {
            let cache = ResultCache::open(&path, config.cache.capacity);
            for key in cache.keys().await {
                println!("{key}");
            }
        }

        CacheCommand::Clear => {
            let cache = ResultCache::open(&path, config.cache.capacity);
            let removed = cache.len().await;
            cache.clear().await;
            tracing::info!("Cleared image result cache at {}", path.display());
            println!("Removed {removed} cached responses");
        }

        CacheCommand::Path => {
            println!("{}", path.display());
        }
    }

    Ok(())
}
