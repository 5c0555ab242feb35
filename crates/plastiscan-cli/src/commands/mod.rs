//! CLI command definitions and handlers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use plastiscan_core::config::ModelConfig;
use plastiscan_core::vision::GeminiClient;
use plastiscan_core::Analyzer;

pub mod analyze;
pub mod serve;

/// Plastiscan - Microplastic detection for water-sample images
#[derive(Parser)]
#[command(name = "plastiscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the analysis web server
    Serve(serve::ServeArgs),

    /// Analyze a local image file
    Analyze(analyze::AnalyzeArgs),
}

/// Vision model flags shared by all commands.
///
/// Unset flags fall back to `GEMINI_API_KEY`, `PLASTISCAN_MODEL`,
/// `PLASTISCAN_GEMINI_URL`, `PLASTISCAN_STRUCTURED_OUTPUT` and
/// `PLASTISCAN_TIMEOUT_SECS`.
#[derive(Args, Clone)]
pub struct ModelArgs {
    /// Gemini model to use for vision analysis
    #[arg(long)]
    pub model: Option<String>,

    /// Gemini API base URL
    #[arg(long)]
    pub gemini_url: Option<String>,

    /// Send no response schema; the reply is parsed from free text
    #[arg(long)]
    pub no_structured_output: bool,

    /// Abort the model call after this many seconds (no limit by default)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl ModelArgs {
    /// Environment config with flags layered on top.
    pub fn to_config(&self) -> Result<ModelConfig> {
        Ok(self.apply(ModelConfig::from_env()?))
    }

    /// Layer the flags that were given over `config`.
    pub fn apply(&self, mut config: ModelConfig) -> ModelConfig {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(url) = &self.gemini_url {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if self.no_structured_output {
            config.structured_output = false;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Some(Duration::from_secs(secs));
        }
        config
    }

    /// Build an analyzer backed by Gemini.
    pub fn build_analyzer(&self) -> Result<Analyzer> {
        let config = self.to_config()?;
        if config.api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY is not set; model calls will fail to authenticate");
        }
        let client = GeminiClient::new(&config)?;
        Ok(Analyzer::new(Arc::new(client), config.structured_output))
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args).await,
            Commands::Analyze(args) => analyze::execute(args).await,
        }
    }
}
