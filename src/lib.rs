//! # pathdump - Lightweight directory mirrors
//!
//! Mirrors a directory tree into a destination, copying small files and
//! replacing large or flagged ones with short text placeholders that record
//! the original size and path.

// Module declarations
pub mod classify;
pub mod commands;
pub mod config;
pub mod executor;
pub mod job;
pub mod scanner;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use job::{DumpEngine, DumpEvent, DumpJob, JobHandle, JobState};
pub use types::{ClassificationDecision, DumpError, DumpStats, FileEntry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
