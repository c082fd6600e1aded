//! Main dump command

use crate::job::{DumpEngine, DumpEvent, JobState};
use crate::types::{DumpError, DumpStats};
use crate::ui::{format_summary, ProgressReporter};
use crate::Config;
use tracing::debug;

/// Output switches for [`run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Final stats are printed as JSON by the caller; no human output
    pub json: bool,
    /// Hide log lines and bars
    pub quiet: bool,
}

impl DumpOptions {
    fn silent(self) -> bool {
        self.json || self.quiet
    }
}

/// Run one dump job on the engine and render its events until it finishes
pub fn run(config: Config, options: DumpOptions) -> Result<DumpStats, DumpError> {
    let reporter = ProgressReporter::new(options.silent());
    let engine = DumpEngine::new();
    let handle = engine.start(config)?;

    let mut processing_started = false;
    for event in handle.events().iter() {
        match event {
            DumpEvent::State(JobState::Scanning) => reporter.start_scan(),
            DumpEvent::State(state) => debug!(%state, "job state"),
            DumpEvent::Log(line) => reporter.log(&line),
            DumpEvent::Progress { processed, total } => {
                if !processing_started {
                    reporter.start_processing(total);
                    processing_started = true;
                }
                reporter.update(processed, total);
            }
            DumpEvent::Complete(stats) => reporter.finish(&stats),
            DumpEvent::Error { message, .. } => reporter.fail(&message),
        }
    }

    let job = handle.wait()?;
    match job.state() {
        JobState::Completed => {
            if !options.silent() {
                println!("{}", format_summary(job.stats()));
            }
            Ok(job.stats().clone())
        }
        state => Err(DumpError::JobFailed(
            job.error()
                .map(str::to_string)
                .unwrap_or_else(|| format!("job ended {}", state)),
        )),
    }
}
