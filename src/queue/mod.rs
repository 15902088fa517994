//! Job Queue
//!
//! The single hand-off point between fetching and scanning. Any number of
//! publishers (one per in-flight clone) feed one consumer, the dispatcher.
//!
//! ```text
//! ┌──────────┐  ┌──────────┐  ┌──────────┐
//! │ clone #1 │  │ clone #2 │  │ clone #3 │
//! └────┬─────┘  └────┬─────┘  └────┬─────┘
//!      │ publish     │ publish     │ publish
//!      ▼             ▼             ▼
//! ┌─────────────────────────────────────────┐
//! │   JobQueue (unbounded FIFO, seq 1,2,3…) │
//! └───────────────────┬─────────────────────┘
//!                     │ recv
//!               ┌─────┴──────┐
//!               │ Dispatcher │
//!               └────────────┘
//! ```
//!
//! The queue is unbounded: publishers never wait, so a slow consumer turns
//! into backlog rather than backpressure. Depth is tracked and a warning
//! is logged each time it crosses the high-water mark.
//!
//! The queue closes when every publisher has been dropped; the consumer then
//! drains what is left and `recv` returns `None`.

mod consumer;
mod error;
mod job;
mod publisher;

pub use consumer::JobConsumer;
pub use error::{QueueError, QueueResult};
pub use job::Job;
pub use publisher::JobPublisher;

use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::unbounded_channel;

/// Backlog depth that triggers a warning
pub const DEFAULT_HIGH_WATER_MARK: usize = 64;

/// State shared between the publisher and consumer halves
pub(crate) struct QueueState {
    /// Next sequence number; the lock also orders sends so sequence == arrival order
    pub(crate) next_sequence: Mutex<u64>,
    pub(crate) pending: AtomicUsize,
    pub(crate) high_water_mark: usize,
}

/// Constructor for a connected publisher/consumer pair
pub struct JobQueue;

impl JobQueue {
    /// Create a queue with the default high-water mark
    pub fn new() -> (JobPublisher, JobConsumer) {
        Self::with_high_water_mark(DEFAULT_HIGH_WATER_MARK)
    }

    /// Create a queue that warns once `high_water_mark` jobs are waiting
    pub fn with_high_water_mark(high_water_mark: usize) -> (JobPublisher, JobConsumer) {
        let (tx, rx) = unbounded_channel();
        let state = Arc::new(QueueState {
            next_sequence: Mutex::new(1),
            pending: AtomicUsize::new(0),
            high_water_mark,
        });

        (
            JobPublisher::new(tx, state.clone()),
            JobConsumer::new(rx, state),
        )
    }
}
