//! Events sent from the dump worker to the caller

use super::JobState;
use crate::types::DumpStats;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Everything a caller can observe about a running job
#[derive(Debug, Clone, PartialEq)]
pub enum DumpEvent {
    /// Lifecycle transition
    State(JobState),
    /// Human-readable log line
    Log(String),
    /// Files handled so far out of the discovered total
    Progress { processed: u64, total: u64 },
    /// Job finished; final counters
    Complete(DumpStats),
    /// Job failed; reported once, with the counters reached so far
    Error { message: String, stats: DumpStats },
}

/// Sending half of the event channel.
///
/// Sends never block; events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<DumpEvent>,
}

impl EventSink {
    /// New unbounded channel
    pub fn channel() -> (EventSink, Receiver<DumpEvent>) {
        let (tx, rx) = unbounded();
        (EventSink { tx }, rx)
    }

    /// Sink whose events go nowhere
    pub fn discard() -> EventSink {
        let (sink, _rx) = Self::channel();
        sink
    }

    pub fn send(&self, event: DumpEvent) {
        let _ = self.tx.send(event);
    }

    pub fn log(&self, message: impl Into<String>) {
        self.send(DumpEvent::Log(message.into()));
    }
}
