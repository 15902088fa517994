//! Queue Error Types

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Job queue is closed; job '{folder}' was not queued")]
    Closed { folder: String },
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
