//! Progress reporting

use crate::types::DumpStats;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal view of a dump job: scan spinner, processing bar, log lines above them
pub struct ProgressReporter {
    scan_bar: ProgressBar,
    process_bar: ProgressBar,
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter; `quiet` hides bars and log lines
    pub fn new(quiet: bool) -> Self {
        let (scan_bar, process_bar) = if quiet {
            (ProgressBar::hidden(), ProgressBar::hidden())
        } else {
            (ProgressBar::new_spinner(), ProgressBar::new(0))
        };

        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            scan_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        if let Ok(style) =
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} files ({percent}%) | {msg}")
        {
            process_bar.set_style(style.progress_chars("=>-"));
        }

        Self {
            scan_bar,
            process_bar,
            quiet,
        }
    }

    /// Mark start of the scanning phase.
    pub fn start_scan(&self) {
        if !self.quiet {
            self.scan_bar.enable_steady_tick(Duration::from_millis(120));
        }
        self.scan_bar.set_message("Scanning source...");
    }

    /// Switch from the spinner to the processing bar.
    pub fn start_processing(&self, total: u64) {
        self.scan_bar
            .finish_with_message(format!("Scanned source: {} files", total));
        self.process_bar.set_length(total);
        self.process_bar.set_position(0);
        self.process_bar.set_message("processing");
    }

    /// Update processing position.
    pub fn update(&self, processed: u64, total: u64) {
        if self.process_bar.length() != Some(total) {
            self.process_bar.set_length(total);
        }
        self.process_bar.set_position(processed);
    }

    /// Print one log line above the bars.
    pub fn log(&self, line: &str) {
        if self.quiet {
            return;
        }
        let active = if self.scan_bar.is_finished() {
            &self.process_bar
        } else {
            &self.scan_bar
        };
        active.suspend(|| println!("{}", line));
    }

    /// Finalize after a completed job.
    pub fn finish(&self, stats: &DumpStats) {
        self.scan_bar.finish_and_clear();
        self.process_bar.finish_with_message(format!(
            "{} copied, {} replaced, {} errors",
            stats.copied + stats.force_kept,
            stats.replaced(),
            stats.errored
        ));
    }

    /// Stop both bars where they are after a failed job.
    pub fn fail(&self, message: &str) {
        self.scan_bar
            .abandon_with_message(format!("{} {}", style("Dump failed:").red().bold(), message));
        self.process_bar.abandon();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Multi-line end-of-run summary
pub fn format_summary(stats: &DumpStats) -> String {
    let mut lines = vec![
        format!("{}", style("Dump summary:").bold()),
        format!("  Files discovered: {}", stats.total_discovered),
        format!("  Copied: {}", stats.copied),
        format!("  Large files replaced: {}", stats.large_replaced),
        format!("  Force replaced: {}", stats.force_replaced),
        format!("  Force kept: {}", stats.force_kept),
    ];
    if stats.errored > 0 {
        lines.push(format!(
            "  {} {}",
            style("Errors:").red(),
            stats.errored
        ));
    }
    if stats.vanished > 0 {
        lines.push(format!("  Vanished: {}", stats.vanished));
    }
    if stats.skipped > 0 {
        lines.push(format!("  Skipped during scan: {}", stats.skipped));
    }
    if stats.excluded_dirs > 0 {
        lines.push(format!(
            "  Excluded: {} files in {} directories",
            stats.excluded_files, stats.excluded_dirs
        ));
    }
    lines.push(format!(
        "  Time: scan {:.1}s, processing {:.1}s",
        stats.scan_duration.as_secs_f64(),
        stats.process_duration.as_secs_f64()
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_bar_tracks_position() {
        let reporter = ProgressReporter::new(true);
        reporter.start_processing(20);
        reporter.update(10, 20);

        assert_eq!(reporter.process_bar.position(), 10);
        assert_eq!(reporter.process_bar.length(), Some(20));
    }

    #[test]
    fn test_update_adopts_new_total() {
        let reporter = ProgressReporter::new(true);
        reporter.start_processing(5);
        reporter.update(3, 8);
        assert_eq!(reporter.process_bar.length(), Some(8));
    }

    #[test]
    fn test_scan_and_finish_execute_without_panicking() {
        let reporter = ProgressReporter::new(true);
        reporter.start_scan();
        reporter.log("quiet line");
        reporter.start_processing(0);
        reporter.finish(&DumpStats::default());
    }

    #[test]
    fn test_summary_lists_counters() {
        let stats = DumpStats {
            total_discovered: 7,
            copied: 3,
            large_replaced: 2,
            force_replaced: 1,
            errored: 1,
            ..DumpStats::default()
        };
        let summary = format_summary(&stats);

        assert!(summary.contains("Files discovered: 7"));
        assert!(summary.contains("Copied: 3"));
        assert!(summary.contains("Large files replaced: 2"));
        assert!(summary.contains("Force replaced: 1"));
        assert!(summary.contains("Errors:"));
        assert!(!summary.contains("Vanished"));
    }
}
