//! DumpStats - Cumulative counters for a dump job

use super::{ClassificationDecision, ExecutionOutcome};
use serde::Serialize;
use std::time::Duration;

/// Counters owned by the running job; snapshots are handed to the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DumpStats {
    /// Files yielded by the walker
    pub total_discovered: u64,

    /// Entries handled so far (terminal outcomes plus vanished)
    pub processed: u64,

    /// Plain copies (`Copy` decision succeeded)
    pub copied: u64,

    /// Replaced because larger than the threshold
    pub large_replaced: u64,

    /// Replaced because of a force-replace extension
    pub force_replaced: u64,

    /// Copied because of a force-keep extension
    pub force_kept: u64,

    /// Error placeholders and other per-file failures
    pub errored: u64,

    /// Discovered, then gone before processing
    pub vanished: u64,

    /// Entries skipped during traversal (unreadable, dangling, not a regular file)
    pub skipped: u64,

    /// Directories pruned by exclusion tokens
    pub excluded_dirs: u64,

    /// Files under pruned directories
    pub excluded_files: u64,

    /// Directories visited by the walker
    pub dirs_scanned: u64,

    /// Wall time of the scan phase
    #[serde(with = "duration_ms")]
    pub scan_duration: Duration,

    /// Wall time of the processing phase
    #[serde(with = "duration_ms")]
    pub process_duration: Duration,
}

impl DumpStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one executed entry under exactly one outcome counter
    pub fn record_outcome(&mut self, decision: ClassificationDecision, outcome: &ExecutionOutcome) {
        self.processed += 1;
        match (decision, outcome) {
            (_, ExecutionOutcome::ErrorPlaceholderWritten { .. }) => self.errored += 1,
            (ClassificationDecision::ForceKeep, _) => self.force_kept += 1,
            (ClassificationDecision::Copy, _) => self.copied += 1,
            (ClassificationDecision::PlaceholderLarge, _) => self.large_replaced += 1,
            (ClassificationDecision::PlaceholderForced, _) => self.force_replaced += 1,
        }
    }

    /// Count an entry whose processing failed outright
    pub fn record_error(&mut self) {
        self.processed += 1;
        self.errored += 1;
    }

    /// Count an entry that disappeared after discovery
    pub fn record_vanished(&mut self) {
        self.processed += 1;
        self.vanished += 1;
    }

    /// Sum over all terminal outcome counters
    pub fn terminal_outcomes(&self) -> u64 {
        self.copied + self.large_replaced + self.force_replaced + self.force_kept + self.errored
    }

    /// Placeholders written for large or forced entries
    pub fn replaced(&self) -> u64 {
        self.large_replaced + self.force_replaced
    }

    /// Progress fraction in `[0, 1]`; an empty job counts as done
    pub fn fraction(&self) -> f64 {
        if self.total_discovered == 0 {
            1.0
        } else {
            (self.processed as f64 / self.total_discovered as f64).min(1.0)
        }
    }

    pub fn percent(&self) -> u64 {
        (self.fraction() * 100.0) as u64
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
