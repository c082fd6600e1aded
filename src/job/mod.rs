//! Dump job lifecycle and the background engine that runs it

mod aggregator;
mod events;

pub use aggregator::{ProgressAggregator, MILESTONE_EVERY, PROGRESS_EVERY, STATUS_EVERY};
pub use events::{DumpEvent, EventSink};

use crate::classify::classify;
use crate::config::{Config, ResolvedRoots};
use crate::executor::{execute, write_access_error};
use crate::scanner::{walk, ExclusionMatcher, DIR_PROGRESS_INTERVAL};
use crate::types::{DumpError, DumpStats, FileEntry};
use crossbeam_channel::Receiver;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Above this many files a slow-run warning is logged
pub const LARGE_LIBRARY_WARNING: u64 = 10_000;
/// Above this many files a notice is logged
pub const LARGE_LIBRARY_NOTICE: u64 = 5_000;

/// Lifecycle of a dump job.
///
/// `Idle -> Scanning -> Processing -> Completed`; any non-terminal state may
/// move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Scanning,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Scanning or processing
    pub fn is_active(self) -> bool {
        matches!(self, JobState::Scanning | JobState::Processing)
    }

    pub fn can_transition_to(self, next: JobState) -> bool {
        match (self, next) {
            (JobState::Idle, JobState::Scanning)
            | (JobState::Scanning, JobState::Processing)
            | (JobState::Processing, JobState::Completed) => true,
            (from, JobState::Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Idle => "idle",
            JobState::Scanning => "scanning",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One run from a source tree into a destination tree
#[derive(Debug)]
pub struct DumpJob {
    config: Config,
    state: JobState,
    stats: DumpStats,
    error: Option<String>,
}

impl DumpJob {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: JobState::Idle,
            stats: DumpStats::default(),
            error: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn stats(&self) -> &DumpStats {
        &self.stats
    }

    /// Message of the failure that ended the job, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Run the job to completion on the current thread.
    ///
    /// Only an `Idle` job can run. Per-file problems are absorbed into the
    /// stats; an error that ends the job moves it to `Failed` and is also
    /// reported through a single `DumpEvent::Error`.
    pub fn run(&mut self, sink: &EventSink) -> Result<&DumpStats, DumpError> {
        if self.state != JobState::Idle {
            return Err(DumpError::InvalidState {
                state: self.state.to_string(),
                action: "start a job",
            });
        }

        match self.execute(sink) {
            Ok(()) => Ok(&self.stats),
            Err(err) => {
                self.fail(sink, &err);
                Err(err)
            }
        }
    }

    fn execute(&mut self, sink: &EventSink) -> Result<(), DumpError> {
        self.log_header(sink);

        let roots = self.config.validate()?;
        let exclude = roots.relativize_exclusions(&self.config.exclude);
        let matcher = ExclusionMatcher::new(&exclude, self.config.exclusion_mode)?;
        fs::create_dir_all(&roots.destination)?;
        info!(
            source = %roots.source.display(),
            destination = %roots.destination.display(),
            "starting dump"
        );

        self.transition(JobState::Scanning, sink)?;
        let entries = self.scan(&roots, &matcher, sink);

        self.transition(JobState::Processing, sink)?;
        self.process(entries, &roots, sink);

        self.transition(JobState::Completed, sink)
    }

    fn log_header(&self, sink: &EventSink) {
        let config = &self.config;
        sink.log("Starting dump...");
        sink.log(format!("Source: {}", config.source.display()));
        sink.log(format!("Output: {}", config.destination.display()));
        sink.log(format!(
            "Size threshold: {:.1} MB",
            config.size_threshold as f64 / (1024.0 * 1024.0)
        ));
        if !config.exclude.is_empty() {
            sink.log(format!("Excluded directories: {}", config.exclude.join(", ")));
        }
        if !config.force_replace.is_empty() {
            sink.log(format!(
                "Force replace extensions: {}",
                config.force_replace.display_list()
            ));
        }
        if !config.force_keep.is_empty() {
            sink.log(format!(
                "Force keep extensions: {}",
                config.force_keep.display_list()
            ));
        }
    }

    fn scan(
        &mut self,
        roots: &ResolvedRoots,
        matcher: &ExclusionMatcher,
        sink: &EventSink,
    ) -> Vec<FileEntry> {
        sink.log("Scanning files...");
        let started = Instant::now();

        let progress_sink = sink.clone();
        let mut walker = walk(&roots.source, matcher).with_progress(
            DIR_PROGRESS_INTERVAL,
            Box::new(move |dirs, files| {
                progress_sink.log(format!(
                    "Scanning... processed {} directories, found {} files",
                    dirs, files
                ));
            }),
        );
        let entries: Vec<FileEntry> = walker.by_ref().collect();
        let summary = walker.summary();

        self.stats.total_discovered = entries.len() as u64;
        self.stats.dirs_scanned = summary.dirs_scanned;
        self.stats.skipped = summary.skipped.len() as u64;
        self.stats.excluded_dirs = summary.excluded_dirs;
        self.stats.excluded_files = summary.excluded_files;
        self.stats.scan_duration = started.elapsed();

        if !summary.skipped.is_empty() {
            sink.log(format!("Skipped {} inaccessible files", summary.skipped.len()));
        }
        if summary.unreadable_dirs > 0 {
            sink.log(format!(
                "Could not read {} directories",
                summary.unreadable_dirs
            ));
        }
        if summary.excluded_dirs > 0 {
            sink.log(format!(
                "Excluded {} files in {} directories",
                summary.excluded_files, summary.excluded_dirs
            ));
        }

        let total = self.stats.total_discovered;
        sink.log(format!("Found {} files to process", total));
        if total > LARGE_LIBRARY_WARNING {
            sink.log(format!(
                "Warning: large library detected ({} files). This may take a while.",
                total
            ));
        } else if total > LARGE_LIBRARY_NOTICE {
            sink.log(format!(
                "Processing {} files. This may take a few minutes.",
                total
            ));
        }
        debug!(
            files = total,
            dirs = summary.dirs_scanned,
            elapsed_ms = self.stats.scan_duration.as_millis() as u64,
            "scan finished"
        );

        entries
    }

    fn process(&mut self, entries: Vec<FileEntry>, roots: &ResolvedRoots, sink: &EventSink) {
        let started = Instant::now();
        let mut aggregator =
            ProgressAggregator::new(sink, self.config.log_interval, self.stats.clone());
        aggregator.begin();

        for entry in &entries {
            self.process_entry(entry, roots, &mut aggregator);
        }

        self.stats = aggregator.finish(&roots.destination, started.elapsed());
    }

    /// Re-stat, classify and execute one entry; every path ends in exactly one record call
    fn process_entry(
        &self,
        entry: &FileEntry,
        roots: &ResolvedRoots,
        aggregator: &mut ProgressAggregator<'_>,
    ) {
        let current = match fs::metadata(&entry.absolute_path) {
            Ok(metadata) => entry.with_size(metadata.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %entry.relative_path.display(), "vanished before processing");
                aggregator.record_vanished(entry);
                return;
            }
            Err(e) => {
                warn!("Cannot access {}: {}", entry.absolute_path.display(), e);
                if let Err(write_err) = write_access_error(entry, &roots.destination, &e) {
                    warn!(
                        "Failed to write error placeholder for {}: {}",
                        entry.relative_path.display(),
                        write_err
                    );
                }
                aggregator.record_error(entry, &e.to_string());
                return;
            }
        };

        let decision = classify(
            &current,
            self.config.size_threshold,
            &self.config.force_replace,
            &self.config.force_keep,
        );
        match execute(&current, decision, &roots.destination) {
            Ok(outcome) => aggregator.record(&current, decision, &outcome),
            Err(err) => {
                warn!("Error processing {}: {}", current.absolute_path.display(), err);
                aggregator.record_error(&current, &err.to_string());
            }
        }
    }

    fn transition(&mut self, next: JobState, sink: &EventSink) -> Result<(), DumpError> {
        if !self.state.can_transition_to(next) {
            return Err(DumpError::InvalidState {
                state: self.state.to_string(),
                action: "change state",
            });
        }
        debug!(from = %self.state, to = %next, "job state");
        self.state = next;
        sink.send(DumpEvent::State(next));
        Ok(())
    }

    fn fail(&mut self, sink: &EventSink, err: &DumpError) {
        let message = err.to_string();
        warn!("Dump failed: {}", message);
        self.state = JobState::Failed;
        self.error = Some(message.clone());
        sink.log(format!("Dump failed: {}", message));
        sink.send(DumpEvent::State(JobState::Failed));
        sink.send(DumpEvent::Error {
            message,
            stats: self.stats.clone(),
        });
    }
}

/// Runs dump jobs on a background thread, one at a time.
///
/// Cloned engines share the same active-job slot.
#[derive(Debug, Clone, Default)]
pub struct DumpEngine {
    active: Arc<AtomicBool>,
}

/// Releases the engine's active slot when the worker finishes or unwinds
struct ActiveSlot(Arc<AtomicBool>);

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DumpEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// A job is currently scanning or processing
    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Start `config` on a worker thread.
    ///
    /// Fails with `JobActive` while another job from this engine is running.
    pub fn start(&self, config: Config) -> Result<JobHandle, DumpError> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DumpError::JobActive)?;
        let slot = ActiveSlot(Arc::clone(&self.active));

        let (sink, events) = EventSink::channel();
        let worker = thread::Builder::new()
            .name("pathdump-worker".to_string())
            .spawn(move || {
                let mut job = DumpJob::new(config);
                let _ = job.run(&sink);
                // Free the slot before the channel closes so a caller that
                // drains events can start the next job straight away.
                drop(slot);
                drop(sink);
                job
            })?;

        Ok(JobHandle { events, worker })
    }
}

/// Caller's side of a running job
#[derive(Debug)]
pub struct JobHandle {
    events: Receiver<DumpEvent>,
    worker: JoinHandle<DumpJob>,
}

impl JobHandle {
    /// Event stream; disconnects once the worker is done
    pub fn events(&self) -> &Receiver<DumpEvent> {
        &self.events
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Block until the worker exits and return the finished job
    pub fn wait(self) -> Result<DumpJob, DumpError> {
        self.worker.join().map_err(|_| DumpError::WorkerPanicked)
    }
}
