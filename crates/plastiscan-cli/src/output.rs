//! Terminal output formatting.

use colored::Colorize;
use plastiscan_core::analysis::model::{AnalysisSummary, Category};
use plastiscan_core::overlay::{LabelledOverlay, RenderSize};

/// Print per-category counts.
pub fn print_summary(summary: &AnalysisSummary) {
    println!("{}", "Microplastics detected".cyan().bold());
    for category in Category::ALL {
        println!("  {:<10} {}", category.as_str(), summary.count(category));
    }
    println!("  {:<10} {}", "Total".bold(), summary.total().to_string().bold());
}

/// Print overlay boxes as a table of pixel positions.
pub fn print_overlays(overlays: &[LabelledOverlay], size: RenderSize) {
    if overlays.is_empty() {
        println!("{}", "No particles to overlay.".dimmed());
        return;
    }

    println!(
        "{} {}",
        "Overlay".bold(),
        format!("({}x{} px)", size.width, size.height).dimmed()
    );
    println!(
        "{:<4} {:<12} {:>8} {:>8} {:>8} {:>8}",
        "#", "Label", "Left", "Top", "Width", "Height"
    );
    println!("{}", "─".repeat(54));

    for (i, overlay) in overlays.iter().enumerate() {
        let label = match Category::parse(&overlay.label) {
            Some(_) => overlay.label.normal(),
            None => overlay.label.yellow(),
        };
        println!(
            "{:<4} {:<12} {:>8.1} {:>8.1} {:>8.1} {:>8.1}",
            i + 1,
            label,
            overlay.rect.left,
            overlay.rect.top,
            overlay.rect.width,
            overlay.rect.height
        );
    }
}
