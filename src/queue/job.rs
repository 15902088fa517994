//! Job type carried by the queue

use serde::Serialize;
use std::time::SystemTime;

/// One cloned repository ready to be scanned
///
/// `folder` names the directory under the staging root. `sequence` is
/// assigned by the queue when the job is published, so it reflects arrival
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub folder: String,
    pub url: String,
    pub sequence: u64,
    #[serde(skip)]
    pub queued_at: SystemTime,
}

impl Job {
    pub fn new(folder: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            url: url.into(),
            sequence: 0, // Will be set by queue
            queued_at: SystemTime::now(),
        }
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}", self.sequence, self.folder)
    }
}
