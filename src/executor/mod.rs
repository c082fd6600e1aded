//! Executor module: carries out classification decisions against the destination tree

pub mod copy;
pub mod placeholder;

pub use copy::{copy_with_metadata, write_atomic};
pub use placeholder::{Placeholder, PlaceholderKind};

use crate::types::{ClassificationDecision, DumpError, ExecutionOutcome, FileEntry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Execute `decision` for `entry`, mirroring it under `dest_root`.
///
/// Copy failures degrade to an error placeholder and are reported as
/// `ErrorPlaceholderWritten`. `Err` is returned only when the destination
/// itself cannot be written (parent directory or placeholder write failed).
pub fn execute(
    entry: &FileEntry,
    decision: ClassificationDecision,
    dest_root: &Path,
) -> Result<ExecutionOutcome, DumpError> {
    let dest_path = prepare_destination(entry, dest_root)?;

    match decision {
        ClassificationDecision::Copy | ClassificationDecision::ForceKeep => {
            match copy_with_metadata(&entry.absolute_path, &dest_path) {
                Ok(bytes) => {
                    debug!(path = %entry.relative_path.display(), bytes, "copied");
                    Ok(ExecutionOutcome::Copied { bytes })
                }
                Err(err) => {
                    let reason = failure_reason(&err);
                    warn!(
                        "Copy failed for {}: {}. Writing error placeholder.",
                        entry.absolute_path.display(),
                        reason
                    );
                    let kind = if decision == ClassificationDecision::ForceKeep {
                        PlaceholderKind::ForceKeepCopyFailed {
                            error: reason.clone(),
                        }
                    } else {
                        PlaceholderKind::CopyFailed {
                            error: reason.clone(),
                        }
                    };
                    write_placeholder(&dest_path, Placeholder::new(kind, entry.size, &entry.absolute_path))?;
                    Ok(ExecutionOutcome::ErrorPlaceholderWritten { reason })
                }
            }
        }
        ClassificationDecision::PlaceholderLarge => {
            write_placeholder(
                &dest_path,
                Placeholder::new(PlaceholderKind::Large, entry.size, &entry.absolute_path),
            )?;
            Ok(ExecutionOutcome::PlaceholderWritten)
        }
        ClassificationDecision::PlaceholderForced => {
            let kind = PlaceholderKind::Forced {
                extension: entry.extension.clone(),
            };
            write_placeholder(&dest_path, Placeholder::new(kind, entry.size, &entry.absolute_path))?;
            Ok(ExecutionOutcome::PlaceholderWritten)
        }
    }
}

/// Record an entry whose source could not be stat'ed at processing time
pub fn write_access_error(
    entry: &FileEntry,
    dest_root: &Path,
    error: &std::io::Error,
) -> Result<ExecutionOutcome, DumpError> {
    let dest_path = prepare_destination(entry, dest_root)?;
    let reason = error.to_string();
    let kind = PlaceholderKind::AccessFailed {
        error: reason.clone(),
    };
    write_placeholder(&dest_path, Placeholder::new(kind, entry.size, &entry.absolute_path))?;
    Ok(ExecutionOutcome::ErrorPlaceholderWritten { reason })
}

/// Mirrored path for `entry`, with its parent directories created
fn prepare_destination(entry: &FileEntry, dest_root: &Path) -> Result<PathBuf, DumpError> {
    let dest_path = entry.destination_in(dest_root);
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(dest_path)
}

fn write_placeholder(dest_path: &Path, placeholder: Placeholder<'_>) -> Result<(), DumpError> {
    write_atomic(dest_path, placeholder.to_string().as_bytes())
}

fn failure_reason(err: &DumpError) -> String {
    match err {
        DumpError::Io(io) => io.to_string(),
        other => other.to_string(),
    }
}
