//! Scanner Error Types

use std::path::PathBuf;

/// Errors that abandon a whole scan
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The directory walk itself failed
    #[error("Could not walk source tree at '{}': {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Nothing survived candidate filtering
    #[error("No files of interest found under '{}'. Maybe it's not a Go project?", .root.display())]
    NoFilesFound { root: PathBuf },

    /// A configured exclusion glob does not compile
    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The blocking scan task panicked or was cancelled
    #[error("Scan task failed: {message}")]
    Task { message: String },
}

/// Errors that skip a single file
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("could not open file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("skipped unreadable file ({}): {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("skipped file with over-long line ({}): line {line} exceeds {max} bytes", .path.display())]
    LineTooLong {
        path: PathBuf,
        line: usize,
        max: usize,
    },
}

impl FileError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            FileError::Open { path, .. }
            | FileError::Read { path, .. }
            | FileError::LineTooLong { path, .. } => path,
        }
    }
}

impl crate::core::error_handling::ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ScanError::InvalidPattern { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ScanError::InvalidPattern { pattern, .. } => Some(pattern.as_str()),
            _ => None,
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
