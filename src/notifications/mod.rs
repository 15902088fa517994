//! Notification System
//!
//! Fan-out of fetch and scan lifecycle events to any number of subscribers.
//! Failures that are deliberately never returned to a caller (clone errors,
//! unterminated import blocks, abandoned scans) are published here so that
//! operational tooling can still observe them.

mod error;
mod event;
mod manager;

pub use error::NotificationError;
pub use event::{Event, EventFilter, FetchEvent, FetchEventType, ScanEvent, ScanEventType};
pub use manager::{EventReceiver, NotificationManager};
