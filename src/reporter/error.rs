//! Reporter Error Types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to write report to {target}: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Diagram service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Diagram service answered with status {status}")]
    Status { status: u16 },

    #[error("Diagram service returned an unexpected body: {message}")]
    InvalidResponse { message: String },

    #[error("Invalid diagram service URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },
}

impl ReportError {
    pub fn io(path: Option<&PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            target: path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "stdout".to_string()),
            source,
        }
    }
}
