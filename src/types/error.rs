//! Error types for pathdump

use std::path::PathBuf;
use thiserror::Error;

/// Error types for pathdump operations
#[derive(Debug, Error)]
pub enum DumpError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error (logic checks)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Source root does not exist
    #[error("Source directory does not exist: {path}")]
    SourceMissing { path: PathBuf },

    /// Source root exists but is not a directory
    #[error("Source is not a directory: {path}")]
    SourceNotDirectory { path: PathBuf },

    /// Destination lies inside (or is) the source tree
    #[error("Output directory {destination} is inside source directory {source_root}")]
    DestinationInsideSource {
        source_root: PathBuf,
        destination: PathBuf,
    },

    /// Source lies inside the destination tree
    #[error("Source directory {source_root} is inside output directory {destination}")]
    SourceInsideDestination {
        source_root: PathBuf,
        destination: PathBuf,
    },

    /// Size threshold is not a positive number
    #[error("Invalid size threshold: {0}")]
    InvalidThreshold(String),

    /// Permission denied for specific path
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Another job is already scanning or processing on this engine
    #[error("A dump job is already running")]
    JobActive,

    /// Lifecycle transition not allowed from the current state
    #[error("Invalid job state: cannot {action} while {state}")]
    InvalidState { state: String, action: &'static str },

    /// The background worker panicked before reporting a result
    #[error("Dump worker terminated unexpectedly")]
    WorkerPanicked,

    /// A background job ended `Failed`; carries the job's error message
    #[error("Dump failed: {0}")]
    JobFailed(String),
}

impl DumpError {
    /// Errors raised before scanning begins; the job never touches the tree.
    pub fn is_preflight_error(&self) -> bool {
        matches!(
            self,
            DumpError::SourceMissing { .. }
                | DumpError::SourceNotDirectory { .. }
                | DumpError::DestinationInsideSource { .. }
                | DumpError::SourceInsideDestination { .. }
                | DumpError::InvalidThreshold(_)
                | DumpError::PermissionDenied { .. }
        )
    }

    /// Check if this error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            DumpError::Validation(_) | DumpError::Config(_) | DumpError::InvalidThreshold(_)
        )
    }

    /// Check if this error is related to permissions
    pub fn is_permission_error(&self) -> bool {
        match self {
            DumpError::PermissionDenied { .. } => true,
            DumpError::Io(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_automatic_conversion() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let dump_error: DumpError = io_error.into();

        assert!(matches!(dump_error, DumpError::Io(_)));
        assert!(dump_error.to_string().contains("IO error"));
    }

    #[test]
    fn test_io_error_from_function() {
        fn returns_io_error() -> Result<(), DumpError> {
            let _file = std::fs::File::open("/nonexistent/path/file.txt")?;
            Ok(())
        }

        let result = returns_io_error();
        assert!(matches!(result, Err(DumpError::Io(_))));
    }

    #[test]
    fn test_nesting_errors_name_both_paths() {
        let error = DumpError::DestinationInsideSource {
            source_root: PathBuf::from("/media"),
            destination: PathBuf::from("/media/dump"),
        };
        let text = error.to_string();
        assert!(text.contains("/media/dump"));
        assert!(text.contains("inside source"));
        assert!(error.is_preflight_error());

        let error = DumpError::SourceInsideDestination {
            source_root: PathBuf::from("/out/media"),
            destination: PathBuf::from("/out"),
        };
        assert!(error.to_string().contains("inside output"));
        assert!(error.is_preflight_error());
    }

    #[test]
    fn test_invalid_threshold() {
        let error = DumpError::InvalidThreshold("abc".to_string());
        assert!(error.to_string().contains("abc"));
        assert!(error.is_validation_error());
        assert!(error.is_preflight_error());
    }

    #[test]
    fn test_is_permission_error() {
        assert!(DumpError::PermissionDenied {
            path: PathBuf::from("file.txt")
        }
        .is_permission_error());
        assert!(DumpError::Io(IoError::new(ErrorKind::PermissionDenied, "nope")).is_permission_error());

        assert!(!DumpError::Config("error".to_string()).is_permission_error());
        assert!(!DumpError::JobActive.is_permission_error());
    }

    #[test]
    fn test_runtime_errors_are_not_preflight() {
        assert!(!DumpError::JobActive.is_preflight_error());
        assert!(!DumpError::WorkerPanicked.is_preflight_error());
        assert!(!DumpError::JobFailed("boom".to_string()).is_preflight_error());
        assert!(!DumpError::Io(IoError::new(ErrorKind::Other, "boom")).is_preflight_error());
    }

    #[test]
    fn test_invalid_state_message() {
        let error = DumpError::InvalidState {
            state: "Completed".to_string(),
            action: "run",
        };
        assert_eq!(
            error.to_string(),
            "Invalid job state: cannot run while Completed"
        );
    }
}
