//! FileEntry - A single file discovered under the source root

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Represents a file discovered by the walker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path in the source tree
    pub absolute_path: PathBuf,

    /// Path relative to the source root
    pub relative_path: PathBuf,

    /// File size in bytes at discovery time
    pub size: u64,

    /// Lowercased, dot-prefixed extension (`""` when the file has none)
    pub extension: String,
}

impl FileEntry {
    /// Create a new FileEntry, deriving the extension from the file name
    pub fn new(absolute_path: PathBuf, relative_path: PathBuf, size: u64) -> Self {
        let extension = extension_of(&absolute_path);
        Self {
            absolute_path,
            relative_path,
            size,
            extension,
        }
    }

    /// Same entry with a freshly observed size
    pub fn with_size(&self, size: u64) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    /// Mirrored location of this entry under `dest_root`
    pub fn destination_in(&self, dest_root: &Path) -> PathBuf {
        dest_root.join(&self.relative_path)
    }
}

/// Extract the lowercased, dot-prefixed extension of a path.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy().to_lowercase()),
        _ => String::new(),
    }
}
