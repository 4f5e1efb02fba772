//! Progress reporting for classification runs
//!
//! Provides a live spinner using indicatif plus a header and summary. Every
//! line goes to stderr so that results on stdout stay clean.

use crate::pipeline::{RunProgress, RunSummary};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays run status
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        let spinner = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        bar.set_style(spinner);

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &RunProgress) {
        let msg = format!(
            "Reads queued: {} | Rate: {:.0}/s | Queue: {}/{} | Backpressure: {}",
            format_number(progress.records_queued),
            progress.records_per_second(),
            progress.queue_len,
            progress.queue_capacity,
            format_number(progress.backpressure_events),
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the run
pub fn print_summary(summary: &RunSummary, output: &str) {
    let secs = summary.duration.as_secs_f64();

    eprintln!();
    eprintln!("{}", style("Classification Complete").green().bold());
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Reads:").bold(), format_number(summary.records_queued));
    eprintln!("  {} {}", style("Classified:").bold(), format_number(summary.classified));
    eprintln!("  {} {}", style("Residues:").bold(), format_number(summary.residues));
    eprintln!(
        "  {} {:.1}s ({:.0} reads/sec)",
        style("Duration:").bold(),
        secs,
        summary.records_per_second()
    );
    if summary.failed > 0 {
        eprintln!("  {} {}", style("Failed:").yellow().bold(), format_number(summary.failed));
    }
    if summary.backpressure_events > 0 {
        eprintln!(
            "  {} {}",
            style("Queue full:").bold(),
            format_number(summary.backpressure_events)
        );
    }
    eprintln!("  {} {}", style("Output:").bold(), output);
    eprintln!();
}

/// Print a header at the start of the run
pub fn print_header(
    index: &str,
    index_bytes: u64,
    inputs: &[String],
    threads: usize,
    output: &str,
) {
    eprintln!();
    eprintln!("{} {}", style("seq-dispatch").cyan().bold(), env!("CARGO_PKG_VERSION"));
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {} ({})", style("Index:").bold(), index, format_size(index_bytes, BINARY));
    for (i, input) in inputs.iter().enumerate() {
        eprintln!("  {} {}", style(format!("Input {}:", i + 1)).bold(), input);
    }
    eprintln!("  {} {}", style("Threads:").bold(), threads);
    eprintln!("  {} {}", style("Output:").bold(), output);
    eprintln!();
}
