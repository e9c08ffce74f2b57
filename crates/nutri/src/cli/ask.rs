//! The `nutri ask` command: one text prompt, response printed as JSON.

use clap::Args;
use nutri_core::llm::{backoff_duration, is_retryable};
use nutri_core::{AskOptions, Config, LlmGateway, LlmResponse};
use std::io::Read;
use std::time::Duration;

use super::types::ProviderArg;

/// Base delay for retry backoff.
const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Arguments for the `ask` command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Prompt text, or "-" to read it from stdin
    pub prompt: String,

    /// Extract JSON from the answer
    #[arg(long)]
    pub json: bool,

    /// Deadline for the call in seconds (defaults to llm.timeout_secs)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retry timeouts, rate limits and server errors up to N times
    #[arg(long, value_name = "N", default_value = "0")]
    pub retries: u32,

    /// Override the configured provider
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Override the provider's text model
    #[arg(long)]
    pub model: Option<String>,
}

/// Execute the ask command.
pub async fn execute(args: AskArgs) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(provider) = args.provider {
        config.llm.provider = provider.into();
    }
    if let Some(model) = &args.model {
        config.llm.model = Some(model.clone());
    }

    let prompt = read_prompt(&args.prompt)?;
    if prompt.trim().is_empty() {
        anyhow::bail!("Prompt is empty");
    }

    let gateway = super::build_gateway(&config, None)?;
    let options = AskOptions {
        wants_json: args.json,
        deadline: args.timeout.map(Duration::from_secs),
    };

    let response =
        ask_with_retries(&gateway, &prompt, options, args.retries, RETRY_BASE_DELAY_MS).await;
    super::print_json(&response)?;

    if let Some(err) = response.error() {
        anyhow::bail!("LLM call failed: {err}");
    }
    Ok(())
}

/// Call the gateway, retrying retryable failures with exponential backoff.
pub async fn ask_with_retries(
    gateway: &LlmGateway,
    prompt: &str,
    options: AskOptions,
    retries: u32,
    base_delay_ms: u64,
) -> LlmResponse {
    let mut attempt = 0;
    loop {
        let response = gateway.ask(prompt, options.clone()).await;
        match response.error() {
            Some(err) if attempt < retries && is_retryable(err) => {
                let delay = backoff_duration(attempt, base_delay_ms);
                tracing::warn!(
                    "Attempt {}/{} failed ({err}), retrying in {:?}",
                    attempt + 1,
                    retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            _ => return response,
        }
    }
}

fn read_prompt(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
