//! Progress aggregation between the worker and the caller

use super::events::{DumpEvent, EventSink};
use crate::types::{ClassificationDecision, DumpStats, ExecutionOutcome, FileEntry};
use std::path::Path;
use std::time::{Duration, Instant};

/// Files between `Progress` events
pub const PROGRESS_EVERY: u64 = 10;
/// Files between status log lines
pub const STATUS_EVERY: u64 = 50;
/// Files between milestone log lines
pub const MILESTONE_EVERY: u64 = 1000;

/// Accumulates `DumpStats` and rate-limits what is sent to the caller
pub struct ProgressAggregator<'a> {
    sink: &'a EventSink,
    stats: DumpStats,
    log_interval: Duration,
    last_file_log: Option<Instant>,
}

impl<'a> ProgressAggregator<'a> {
    /// Continue from `stats` (scan counters already filled in)
    pub fn new(sink: &'a EventSink, log_interval: Duration, stats: DumpStats) -> Self {
        Self {
            sink,
            stats,
            log_interval,
            last_file_log: None,
        }
    }

    pub fn stats(&self) -> &DumpStats {
        &self.stats
    }

    /// Announce the start of processing
    pub fn begin(&mut self) {
        self.sink.send(DumpEvent::Progress {
            processed: 0,
            total: self.stats.total_discovered,
        });
    }

    /// One executed entry
    pub fn record(
        &mut self,
        entry: &FileEntry,
        decision: ClassificationDecision,
        outcome: &ExecutionOutcome,
    ) {
        self.stats.record_outcome(decision, outcome);

        match outcome {
            ExecutionOutcome::ErrorPlaceholderWritten { reason } => {
                self.sink.log(format!(
                    "Copy failed: {} - {}",
                    entry.relative_path.display(),
                    reason
                ));
            }
            _ => match decision {
                ClassificationDecision::ForceKeep => self.throttled_log(format!(
                    "Force kept file: {}",
                    entry.relative_path.display()
                )),
                ClassificationDecision::PlaceholderForced => self.throttled_log(format!(
                    "Force replaced file: {}",
                    entry.relative_path.display()
                )),
                ClassificationDecision::PlaceholderLarge => self.throttled_log(format!(
                    "Replaced large file: {} ({} bytes)",
                    entry.relative_path.display(),
                    entry.size
                )),
                ClassificationDecision::Copy => {}
            },
        }

        self.after_entry();
    }

    /// An entry whose processing failed outright
    pub fn record_error(&mut self, entry: &FileEntry, reason: &str) {
        self.stats.record_error();
        self.sink.log(format!(
            "Error processing file: {} - {}",
            entry.absolute_path.display(),
            reason
        ));
        self.after_entry();
    }

    /// An entry that disappeared after discovery
    pub fn record_vanished(&mut self, entry: &FileEntry) {
        self.stats.record_vanished();
        self.sink.log(format!(
            "File disappeared before processing: {}",
            entry.relative_path.display()
        ));
        self.after_entry();
    }

    /// Emit the final progress and summary, then `Complete`
    pub fn finish(mut self, output: &Path, elapsed: Duration) -> DumpStats {
        self.stats.process_duration = elapsed;
        let s = &self.stats;

        self.sink.send(DumpEvent::Progress {
            processed: s.processed,
            total: s.total_discovered,
        });
        self.sink.log("Dump completed");
        self.sink.log(format!("Total files: {}", s.total_discovered));
        self.sink.log(format!("Large files replaced: {}", s.large_replaced));
        if s.force_replaced > 0 {
            self.sink.log(format!("Force replaced files: {}", s.force_replaced));
        }
        if s.force_kept > 0 {
            self.sink.log(format!("Force kept files: {}", s.force_kept));
        }
        if s.errored > 0 {
            self.sink.log(format!("Files with errors: {}", s.errored));
        }
        if s.vanished > 0 {
            self.sink.log(format!("Files vanished during dump: {}", s.vanished));
        }
        self.sink.log(format!("Output directory: {}", output.display()));

        self.sink.send(DumpEvent::Complete(self.stats.clone()));
        self.stats
    }

    fn throttled_log(&mut self, message: String) {
        let due = self
            .last_file_log
            .map_or(true, |last| last.elapsed() >= self.log_interval);
        if due {
            self.sink.log(message);
            self.last_file_log = Some(Instant::now());
        }
    }

    fn after_entry(&mut self) {
        let s = &self.stats;
        let processed = s.processed;

        if processed % PROGRESS_EVERY == 0 {
            self.sink.send(DumpEvent::Progress {
                processed,
                total: s.total_discovered,
            });
        }
        if processed % STATUS_EVERY == 0 {
            self.sink.log(format!(
                "Processing... {}/{} files ({}%) - {} large, {} force replaced, {} force kept",
                processed,
                s.total_discovered,
                s.percent(),
                s.large_replaced,
                s.force_replaced,
                s.force_kept
            ));
        }
        if processed % MILESTONE_EVERY == 0 {
            self.sink.log(format!(
                "Milestone: {} files processed, {} large files, {} force replaced, {} force kept, {} errors",
                processed, s.large_replaced, s.force_replaced, s.force_kept, s.errored
            ));
        }
    }
}
