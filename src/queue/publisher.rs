//! Publishing half of the job queue

use crate::queue::error::{QueueError, QueueResult};
use crate::queue::job::Job;
use crate::queue::QueueState;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Cloneable handle for adding jobs to the queue
///
/// Each spawned fetch task holds its own clone; the queue stays open until
/// the last one is dropped.
#[derive(Clone)]
pub struct JobPublisher {
    tx: UnboundedSender<Job>,
    state: Arc<QueueState>,
}

impl JobPublisher {
    pub(crate) fn new(tx: UnboundedSender<Job>, state: Arc<QueueState>) -> Self {
        Self { tx, state }
    }

    /// Publish a job, returning the sequence number it was assigned
    pub fn publish(&self, mut job: Job) -> QueueResult<u64> {
        let mut next = self
            .state
            .next_sequence
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        job.sequence = *next;
        let sequence = job.sequence;

        // Counted before sending so the consumer can never observe a negative depth
        let depth = self.state.pending.fetch_add(1, Ordering::AcqRel) + 1;
        if let Err(rejected) = self.tx.send(job) {
            self.state.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(QueueError::Closed {
                folder: rejected.0.folder,
            });
        }
        *next += 1;
        drop(next);

        if depth == self.state.high_water_mark {
            log::warn!(
                "Job backlog reached {} pending scans; clones are completing faster than scans",
                depth
            );
        }

        Ok(sequence)
    }

    /// Number of jobs published but not yet received
    pub fn pending(&self) -> usize {
        self.state.pending.load(Ordering::Acquire)
    }

    /// True once the consumer has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
