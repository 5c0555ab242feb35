//! Analyze a local image file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use plastiscan_core::analysis::model::AnalysisRequest;
use plastiscan_core::image::read_data_url;
use plastiscan_core::overlay::{self, RenderSize};
use plastiscan_core::session::{ScanSession, ScanState};

use super::ModelArgs;
use crate::output;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Image file to analyze (JPEG, PNG, WebP, ...)
    pub path: PathBuf,

    /// Width of the rendered image, for overlay positions
    #[arg(long, default_value_t = 800.0)]
    pub render_width: f64,

    /// Height of the rendered image, for overlay positions
    #[arg(long, default_value_t = 600.0)]
    pub render_height: f64,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

pub async fn execute(args: AnalyzeArgs) -> Result<()> {
    let analyzer = args.model.build_analyzer()?;
    let mut session = ScanSession::new();

    session.acquire()?;
    let image = match read_data_url(&args.path) {
        Ok(image) => image,
        Err(e) => {
            session.fail(format!("Failed to read {}: {}", args.path.display(), e))?;
            return report(&session, &args);
        }
    };

    session.begin_analysis(image.clone())?;
    let spinner = spinner(&format!("Analyzing {}", args.path.display()));
    let (_, result) = analyzer.analyze_or_fallback(&AnalysisRequest::new(image)).await;
    spinner.finish_and_clear();
    session.complete(result)?;

    report(&session, &args)
}

fn report(session: &ScanSession, args: &AnalyzeArgs) -> Result<()> {
    let size = RenderSize::new(args.render_width, args.render_height);

    match session.state() {
        ScanState::Done(result) => {
            let overlays = overlay::layout(&result.analysis, size);
            if args.json {
                let value = serde_json::json!({
                    "analysis": result.analysis,
                    "overlays": overlays,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                output::print_summary(&result.analysis.summary);
                println!();
                output::print_overlays(&overlays, size);
            }
            Ok(())
        }
        ScanState::Failed(error) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "error": error }))?);
            } else {
                println!("{} {}", "✗".red().bold(), error);
            }
            anyhow::bail!("Analysis failed")
        }
        other => anyhow::bail!("Scan ended in unexpected state '{}'", other.name()),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
