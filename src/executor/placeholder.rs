//! Placeholder file contents

use std::fmt;
use std::path::Path;

/// Why a placeholder stands in for the original file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// Larger than the size threshold
    Large,
    /// Extension is in the force-replace set
    Forced { extension: String },
    /// Copying a regular file failed
    CopyFailed { error: String },
    /// Copying a force-keep file failed
    ForceKeepCopyFailed { error: String },
    /// The source could not be stat'ed at processing time
    AccessFailed { error: String },
}

/// Text written in place of an original file
#[derive(Debug, Clone)]
pub struct Placeholder<'a> {
    pub kind: PlaceholderKind,
    pub original_size: u64,
    pub original_path: &'a Path,
}

impl<'a> Placeholder<'a> {
    pub fn new(kind: PlaceholderKind, original_size: u64, original_path: &'a Path) -> Self {
        Self {
            kind,
            original_size,
            original_path,
        }
    }
}

impl fmt::Display for Placeholder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.original_path.display();
        match &self.kind {
            PlaceholderKind::Large => {
                writeln!(f, "# Placeholder for large file")?;
                writeln!(f, "# Original size: {} bytes", self.original_size)?;
                writeln!(f, "# Original path: {}", path)
            }
            PlaceholderKind::Forced { extension } => {
                writeln!(f, "# Placeholder for force-replaced file")?;
                writeln!(f, "# Extension: {}", extension)?;
                writeln!(f, "# Original size: {} bytes", self.original_size)?;
                writeln!(f, "# Original path: {}", path)
            }
            PlaceholderKind::CopyFailed { error } | PlaceholderKind::ForceKeepCopyFailed { error } => {
                if matches!(self.kind, PlaceholderKind::ForceKeepCopyFailed { .. }) {
                    writeln!(f, "# Copy failed for force-keep file")?;
                } else {
                    writeln!(f, "# Copy failed for file")?;
                }
                writeln!(f, "# Original size: {} bytes", self.original_size)?;
                writeln!(f, "# Original path: {}", path)?;
                writeln!(f, "# Error: {}", error)
            }
            PlaceholderKind::AccessFailed { error } => {
                writeln!(f, "# Error accessing file")?;
                writeln!(f, "# Original path: {}", path)?;
                writeln!(f, "# Error: {}", error)
            }
        }
    }
}
