//! Reporter Component
//!
//! Sinks for finished scans. Each reporter receives the same immutable
//! [`ScanReport`]; a failing reporter is logged by the dispatcher and never
//! stops the others or the queue.

pub mod console;
pub mod diagram;
mod error;

pub use console::{ConsoleReporter, ReportFormat};
pub use diagram::{DiagramClient, DiagramReporter, DiagramResponse};
pub use error::ReportError;

use crate::queue::Job;
use crate::weights::WeightMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Everything known about one completed scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub job: Job,
    pub weights: WeightMap,
    /// Files that produced a record
    pub packages: usize,
    /// Candidate files read
    pub files_scanned: usize,
    pub completed_at: DateTime<Utc>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// A destination for scan reports
#[async_trait]
pub trait Reporter: Send + Sync {
    fn name(&self) -> &str;

    async fn emit(&self, report: &ScanReport) -> Result<(), ReportError>;
}
