//! Consuming half of the job queue

use crate::queue::job::Job;
use crate::queue::QueueState;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Sole reader of the job queue
///
/// Not cloneable: exactly one consumer exists per queue, which is what
/// keeps scans strictly sequential.
pub struct JobConsumer {
    rx: UnboundedReceiver<Job>,
    state: Arc<QueueState>,
}

impl JobConsumer {
    pub(crate) fn new(rx: UnboundedReceiver<Job>, state: Arc<QueueState>) -> Self {
        Self { rx, state }
    }

    /// Wait for the next job in arrival order.
    ///
    /// Returns `None` once every publisher is gone and the backlog is empty.
    pub async fn recv(&mut self) -> Option<Job> {
        let job = self.rx.recv().await?;
        self.state.pending.fetch_sub(1, Ordering::AcqRel);
        Some(job)
    }

    /// Non-blocking variant of [`recv`](Self::recv)
    pub fn try_recv(&mut self) -> Option<Job> {
        let job = self.rx.try_recv().ok()?;
        self.state.pending.fetch_sub(1, Ordering::AcqRel);
        Some(job)
    }

    /// Number of jobs waiting to be received
    pub fn pending(&self) -> usize {
        self.state.pending.load(Ordering::Acquire)
    }

    /// Stop accepting new jobs; already queued jobs can still be received
    pub fn close(&mut self) {
        self.rx.close();
    }
}
