//! Core type definitions for pathdump

mod decision;
mod entry;
mod error;
mod extension;
mod stats;

pub use decision::{ClassificationDecision, ExecutionOutcome};
pub use entry::{extension_of, FileEntry};
pub use error::DumpError;
pub use extension::{normalize_extension, ExtensionSet};
pub use stats::DumpStats;
