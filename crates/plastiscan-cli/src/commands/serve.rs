//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use plastiscan_core::config::{ServerConfig, DEFAULT_MAX_BODY_BYTES};
use plastiscan_web::state::AppState;
use std::path::PathBuf;

use super::ModelArgs;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Origin allowed to call the API from a browser (any origin if unset)
    #[arg(long, env = "PLASTISCAN_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (defaults to ./plastiscan-serve.log)
    #[arg(long, requires = "log")]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let analyzer = args.model.build_analyzer()?;
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        allowed_origin: args.allowed_origin,
        max_body_bytes: args.max_body_bytes,
    };

    println!();
    println!("  {} {}", "Plastiscan".cyan().bold(), "Web Server".bold());
    println!();
    println!(
        "  {}     http://{}/api/analyze-image",
        "Analyze".green(),
        config.bind_addr()
    );
    println!(
        "  {}      http://{}/api/health",
        "Health".green(),
        config.bind_addr()
    );
    println!(
        "  {}       {}{}",
        "Model".green(),
        analyzer.model_name(),
        if analyzer.structured_output() { "" } else { " (no schema)" }
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    plastiscan_web::run_server(AppState::new(analyzer), &config).await?;

    Ok(())
}
