//! CLI enum types shared by the subcommands.

use clap::ValueEnum;
use nutri_core::config::ProviderKind;

/// Supported LLM providers.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProviderArg {
    /// OpenAI API (text and vision)
    Openai,
    /// DeepSeek API (text only)
    Deepseek,
    /// Local Ollama instance
    Ollama,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Openai => ProviderKind::OpenAi,
            ProviderArg::Deepseek => ProviderKind::DeepSeek,
            ProviderArg::Ollama => ProviderKind::Ollama,
        }
    }
}
