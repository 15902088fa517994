//! Fetcher Error Types

use crate::core::error_handling::ContextualError;
use std::path::PathBuf;

/// Rejections returned synchronously by [`Fetcher::retrieve_project`](super::Fetcher::retrieve_project)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Cannot use '{host}'; only {expected} projects are supported")]
    UnsupportedHost { host: String, expected: String },
}

impl ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidUrl { reason, .. } => Some(reason.as_str()),
            ValidationError::UnsupportedHost { .. } => {
                Some("repository host is not supported by this service")
            }
        }
    }
}

/// Failures inside the spawned clone task; never returned to the submitter
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error("Failed to prepare staging directory {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git clone exited with {status}: {stderr}")]
    Command { status: String, stderr: String },

    #[error("Clone failed: {message}")]
    Gix { message: String },

    #[error("Clone task failed: {message}")]
    Task { message: String },
}

impl ContextualError for CloneError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, CloneError::Spawn { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            CloneError::Spawn { .. } => Some("is git installed and on PATH?"),
            _ => None,
        }
    }
}
