//! Progress bar and summaries for batch commands

use a2p_engine::{BatchReport, RecordState};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Create a progress bar counting settled rows
pub fn create_row_progress(total: u64, pass: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} rows ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(format!("Running {}", pass));
    pb
}

/// One line for a settled row, or nothing when the row went through cleanly
pub fn row_line(record: &RecordState) -> Option<String> {
    record
        .error()
        .map(|err| format!("{} {}", "✗".red(), err))
}

/// Human-readable run duration
pub fn format_duration(duration: chrono::Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", millis as f64 / 1_000.0)
    } else {
        format!("{}m {:02}s", millis / 60_000, (millis % 60_000) / 1_000)
    }
}

pub fn print_summary(report: &BatchReport, output: &Path) {
    let mark = if report.failed == 0 {
        "✓".green()
    } else {
        "!".yellow()
    };

    println!(
        "{} {}: {} rows in {}",
        mark,
        report.pass.bold(),
        report.total,
        format_duration(report.duration())
    );
    println!("  Succeeded: {}", report.succeeded().to_string().green());
    if report.failed > 0 {
        println!("  Failed:    {}", report.failed.to_string().red());
    }
    println!("  Skipped:   {}", report.skipped);
    if report.awaiting_rerun > 0 {
        println!(
            "  Pending:   {} (run 'a2p resume' or 'a2p refresh' later)",
            report.awaiting_rerun.to_string().yellow()
        );
    }
    println!("  Written:   {}", output.display());
}
