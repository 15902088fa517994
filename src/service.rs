//! Service
//!
//! Owns one job queue and wires its two ends: the publisher goes to the
//! [`Fetcher`], the consumer to a spawned [`Dispatcher`]. Stopping the
//! service releases the publisher; the dispatcher then finishes whatever
//! in-flight clones still deliver and exits.

use crate::dispatcher::{DispatchStats, Dispatcher};
use crate::fetcher::{Cloner, FetchConfig, Fetcher};
use crate::notifications::NotificationManager;
use crate::queue::JobQueue;
use crate::reporter::Reporter;
use crate::scanner::{ScanResult, Scanner, ScannerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub fetch: FetchConfig,
    pub scanner: ScannerConfig,
}

pub struct Service {
    fetcher: Fetcher,
    notifications: Arc<NotificationManager>,
    dispatcher: JoinHandle<DispatchStats>,
}

impl Service {
    /// Build the pipeline and start the dispatcher.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: ServiceConfig,
        cloner: Arc<dyn Cloner>,
        reporters: Vec<Arc<dyn Reporter>>,
    ) -> ScanResult<Self> {
        let scanner = Scanner::new(&config.scanner)?;
        let notifications = Arc::new(NotificationManager::new());
        let (publisher, consumer) = JobQueue::new();

        let reporter_names: Vec<&str> = reporters.iter().map(|r| r.name()).collect();
        log::debug!(
            "starting service: staging {}, {} cloner, reporters [{}]",
            config.fetch.staging_dir.display(),
            cloner.name(),
            reporter_names.join(", ")
        );

        let dispatcher = Dispatcher::new(
            scanner,
            config.fetch.staging_dir.clone(),
            reporters,
            notifications.clone(),
        )
        .spawn(consumer);
        let fetcher = Fetcher::new(config.fetch, cloner, publisher, notifications.clone());

        Ok(Self {
            fetcher,
            notifications,
            dispatcher,
        })
    }

    /// Entry point for new repositories; cheap to clone
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn notifications(&self) -> Arc<NotificationManager> {
        self.notifications.clone()
    }

    /// Release the queue and wait up to `grace` for outstanding work.
    ///
    /// Every clone of [`fetcher`](Self::fetcher) handed out must be dropped
    /// first, or the queue cannot close. Returns `None` if the grace period
    /// ran out.
    pub async fn stop(self, grace: Duration) -> Option<DispatchStats> {
        let Service {
            fetcher,
            dispatcher,
            ..
        } = self;
        drop(fetcher);

        let abort = dispatcher.abort_handle();
        match tokio::time::timeout(grace, dispatcher).await {
            Ok(Ok(stats)) => Some(stats),
            Ok(Err(e)) => {
                log::error!("dispatcher task failed: {}", e);
                None
            }
            Err(_) => {
                log::warn!(
                    "outstanding work not finished within {:?}; abandoning it",
                    grace
                );
                abort.abort();
                None
            }
        }
    }
}
