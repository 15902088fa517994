//! Dispatcher
//!
//! The single consumer of the job queue. Jobs are handled strictly one at a
//! time in arrival order: scan, aggregate, report, and only then receive the
//! next job. A failing job is logged and published as an event; it never
//! stops the loop.

use crate::core::error_handling::ContextualError;
use crate::notifications::{Event, NotificationManager, ScanEvent, ScanEventType};
use crate::queue::{Job, JobConsumer};
use crate::reporter::{Reporter, ScanReport};
use crate::scanner::{FileDiagnostic, ScanError, ScanResult, Scanner, TreeScan};
use crate::weights::build_weights;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Totals returned when the queue closes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub completed: usize,
    pub failed: usize,
}

pub struct Dispatcher {
    scanner: Arc<Scanner>,
    staging_dir: PathBuf,
    reporters: Vec<Arc<dyn Reporter>>,
    notifications: Arc<NotificationManager>,
}

impl Dispatcher {
    pub fn new(
        scanner: Scanner,
        staging_dir: impl Into<PathBuf>,
        reporters: Vec<Arc<dyn Reporter>>,
        notifications: Arc<NotificationManager>,
    ) -> Self {
        Self {
            scanner: Arc::new(scanner),
            staging_dir: staging_dir.into(),
            reporters,
            notifications,
        }
    }

    /// Start the consumer loop on the runtime
    pub fn spawn(self, consumer: JobConsumer) -> JoinHandle<DispatchStats> {
        tokio::spawn(self.run(consumer))
    }

    /// Drain the queue until every publisher is gone
    pub async fn run(self, mut consumer: JobConsumer) -> DispatchStats {
        let mut stats = DispatchStats::default();
        log::debug!("dispatcher started");

        while let Some(job) = consumer.recv().await {
            match self.process(job).await {
                Ok(_) => stats.completed += 1,
                Err(_) => stats.failed += 1,
            }
        }

        log::info!(
            "dispatcher stopped: {} scans completed, {} failed",
            stats.completed,
            stats.failed
        );
        stats
    }

    /// Scan, aggregate and report one job
    pub async fn process(&self, job: Job) -> ScanResult<ScanReport> {
        let started = Instant::now();
        let root = self.staging_dir.join(&job.folder);
        log::info!("scanning job {} at {}", job, root.display());
        self.notify(&job, ScanEventType::Started, None);

        let (result, diagnostics) = self.scan(root).await;

        for diagnostic in diagnostics {
            let (event_type, message) = match diagnostic {
                FileDiagnostic::Skipped(e) => (ScanEventType::FileSkipped, e.to_string()),
                FileDiagnostic::Unterminated {
                    path,
                    package,
                    imports,
                } => (
                    ScanEventType::UnterminatedImportBlock,
                    format!(
                        "{}: package '{}' dropped with {} import(s)",
                        path.display(),
                        package,
                        imports
                    ),
                ),
            };
            self.notify(&job, event_type, Some(message));
        }

        let scan = match result {
            Ok(scan) => scan,
            Err(e) => {
                match e.user_message() {
                    Some(hint) if e.is_user_actionable() => {
                        log::error!("scan of {} failed: {} ({})", job, e, hint)
                    }
                    _ => log::error!("scan of {} failed: {}", job, e),
                }
                self.notify(&job, ScanEventType::Error, Some(e.to_string()));
                return Err(e);
            }
        };

        let weights = build_weights(&scan.packages);
        log::info!(
            "job {}: {} records from {} files, {} edges",
            job,
            scan.packages.len(),
            scan.files_scanned,
            weights.len()
        );

        let report = ScanReport {
            job,
            weights,
            packages: scan.packages.len(),
            files_scanned: scan.files_scanned,
            completed_at: Utc::now(),
            duration: started.elapsed(),
        };

        self.emit(&report).await;
        self.notify(&report.job, ScanEventType::Completed, None);
        Ok(report)
    }

    /// Run the blocking directory scan off the async workers
    async fn scan(&self, root: PathBuf) -> (ScanResult<TreeScan>, Vec<FileDiagnostic>) {
        let scanner = self.scanner.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let mut diagnostics = Vec::new();
            let result = scanner.scan_tree(&root, |d| diagnostics.push(d));
            (result, diagnostics)
        })
        .await;

        joined.unwrap_or_else(|e| {
            (
                Err(ScanError::Task {
                    message: e.to_string(),
                }),
                Vec::new(),
            )
        })
    }

    async fn emit(&self, report: &ScanReport) {
        let deliveries = self.reporters.iter().map(|reporter| async move {
            (reporter.name().to_string(), reporter.emit(report).await)
        });

        for (name, result) in futures::future::join_all(deliveries).await {
            if let Err(e) = result {
                log::error!("reporter '{}' failed for job {}: {}", name, report.job, e);
            }
        }
    }

    fn notify(&self, job: &Job, event_type: ScanEventType, message: Option<String>) {
        let mut event = ScanEvent::new(event_type, &job.folder, job.sequence);
        if let Some(message) = message {
            event = event.with_message(message);
        }
        self.notifications.notify(Event::Scan(event));
    }
}
