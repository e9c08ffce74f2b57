//! Nutri CLI - command-line front end for the nutrition LLM gateway.
//!
//! Sends prompts and meal photos to the configured LLM provider and prints
//! normalized responses as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Ask a question and extract JSON from the answer
//! nutri ask "Daily macro targets for a 70kg runner" --json
//!
//! # Analyze a meal photo
//! nutri analyze lunch.jpg
//!
//! # Inspect the image result cache
//! nutri cache stats
//!
//! # View configuration
//! nutri config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Nutri - LLM gateway for nutrition tracking.
#[derive(Parser, Debug)]
#[command(name = "nutri")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a text prompt to the configured provider
    Ask(cli::ask::AskArgs),

    /// Identify a dish from a meal photo and score it
    Analyze(cli::analyze::AnalyzeArgs),

    /// Inspect or clear the image result cache
    Cache(cli::cache::CacheArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API keys may live in a .env file next to the working directory
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match nutri_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `nutri config path`."
            );
            nutri_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("nutri v{}", nutri_core::VERSION);

    match cli.command {
        Commands::Ask(args) => cli::ask::execute(args).await,
        Commands::Analyze(args) => cli::analyze::execute(args).await,
        Commands::Cache(args) => cli::cache::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
