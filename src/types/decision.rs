//! Classification decisions and execution outcomes

use serde::Serialize;
use std::fmt;

/// What the classifier decided to do with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClassificationDecision {
    /// Copy bytes verbatim (at or below the size threshold)
    Copy,

    /// Replace with a placeholder because the file exceeds the threshold
    PlaceholderLarge,

    /// Replace with a placeholder because its extension is force-replaced
    PlaceholderForced,

    /// Copy bytes verbatim because its extension is force-kept
    ForceKeep,
}

impl ClassificationDecision {
    /// Whether this decision copies the original bytes
    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy | Self::ForceKeep)
    }

    pub fn is_placeholder(&self) -> bool {
        !self.is_copy()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Copy => "Copy",
            Self::PlaceholderLarge => "Replace (large)",
            Self::PlaceholderForced => "Replace (forced)",
            Self::ForceKeep => "Keep (forced)",
        }
    }
}

impl fmt::Display for ClassificationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of executing a decision against the destination tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Original bytes and mtime copied
    Copied { bytes: u64 },

    /// Placeholder text written in place of the original
    PlaceholderWritten,

    /// Copy failed; an error placeholder was written instead
    ErrorPlaceholderWritten { reason: String },
}

impl ExecutionOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ErrorPlaceholderWritten { .. })
    }
}
