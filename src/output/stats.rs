//! Statistics reporting.

use console::style;

use crate::sync::RunReport;

/// Print statistics for a completed run.
pub fn print_run_stats(report: &RunReport) {
    let stats = &report.stats;

    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!(
        "{}",
        style(format!(
            "Sync statistics for {} ({}):",
            report.user_name, report.user_id
        ))
        .bold()
    );
    println!("  Dependents: {}", stats.dependents);
    println!(
        "  Sections:   {} ({} without albums)",
        stats.sections, stats.empty_sections
    );
    println!(
        "  Albums:     {} new, {} already downloaded",
        style(stats.albums_downloaded).green(),
        style(stats.albums_skipped).yellow()
    );
    println!("  Files:      {} downloaded", stats.files_downloaded);
    if stats.files_failed > 0 {
        println!("  Failed:     {}", style(stats.files_failed).red());
    }
    println!("{}", style("═".repeat(50)).dim());
}
