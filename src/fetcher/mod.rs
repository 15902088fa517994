//! Fetcher Component
//!
//! Validates a repository URL, clones it in the background, and publishes
//! a [`Job`] once the checkout is on disk.
//!
//! Validation happens before anything is spawned, so a rejected URL never
//! starts a subprocess. Once accepted, the clone's fate is only visible
//! through the log, the notification channel, and the returned
//! [`FetchTicket`], which callers are free to drop.

pub mod clone;
pub mod error;
pub mod folder;
pub mod validate;

pub use clone::{CloneBackend, CloneStatus, Cloner, GitCommandCloner, GixCloner};
pub use error::{CloneError, ValidationError};
pub use folder::{derive_folder_name, FolderNaming};
pub use validate::validate_url;

use crate::core::error_handling::ContextualError;
use crate::notifications::{Event, FetchEvent, FetchEventType, NotificationManager};
use crate::queue::{Job, JobPublisher, QueueError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Fetcher settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Clone destination root; also the scan root
    pub staging_dir: PathBuf,
    /// The only host accepted for non-SSH URLs
    pub expected_host: String,
    pub folder_naming: FolderNaming,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("./tmp"),
            expected_host: "github.com".to_string(),
            folder_naming: FolderNaming::Segment,
        }
    }
}

/// How a background fetch ended
#[derive(Debug)]
pub enum FetchOutcome {
    /// Checkout available and job published
    Queued(Job),
    /// Clone failed; no job was produced
    Failed(CloneError),
    /// Clone succeeded but the queue had already shut down
    NotQueued(QueueError),
}

impl FetchOutcome {
    pub fn job(&self) -> Option<&Job> {
        match self {
            FetchOutcome::Queued(job) => Some(job),
            _ => None,
        }
    }
}

/// Handle to one background fetch
pub struct FetchTicket {
    folder: String,
    handle: JoinHandle<FetchOutcome>,
}

impl FetchTicket {
    /// Folder the repository is cloned into
    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the fetch to end
    pub async fn outcome(self) -> FetchOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => FetchOutcome::Failed(CloneError::Task {
                message: e.to_string(),
            }),
        }
    }
}

/// Accepts repository URLs and turns successful clones into jobs
#[derive(Clone)]
pub struct Fetcher {
    config: Arc<FetchConfig>,
    cloner: Arc<dyn Cloner>,
    publisher: JobPublisher,
    notifications: Arc<NotificationManager>,
}

impl Fetcher {
    pub fn new(
        config: FetchConfig,
        cloner: Arc<dyn Cloner>,
        publisher: JobPublisher,
        notifications: Arc<NotificationManager>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            cloner,
            publisher,
            notifications,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Validate `url` and start cloning it in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn retrieve_project(&self, url: &str) -> Result<FetchTicket, ValidationError> {
        let url = url.trim();
        validate_url(url, &self.config.expected_host)?;

        let folder = derive_folder_name(url, self.config.folder_naming);
        if folder.is_empty() || folder == "." || folder == ".." {
            return Err(ValidationError::InvalidUrl {
                url: url.to_string(),
                reason: "URL does not name a repository".to_string(),
            });
        }

        log::info!("accepted {} (folder '{}', {} backend)", url, folder, self.cloner.name());
        self.notifications.notify(Event::Fetch(
            FetchEvent::new(FetchEventType::Accepted, url).with_folder(&folder),
        ));

        let task = FetchTask {
            url: url.to_string(),
            folder: folder.clone(),
            dest: self.config.staging_dir.join(&folder),
            staging_dir: self.config.staging_dir.clone(),
            cloner: self.cloner.clone(),
            publisher: self.publisher.clone(),
            notifications: self.notifications.clone(),
        };
        let handle = tokio::spawn(task.run());

        Ok(FetchTicket { folder, handle })
    }
}

/// Everything the background clone needs, owned
struct FetchTask {
    url: String,
    folder: String,
    dest: PathBuf,
    staging_dir: PathBuf,
    cloner: Arc<dyn Cloner>,
    publisher: JobPublisher,
    notifications: Arc<NotificationManager>,
}

impl FetchTask {
    async fn run(self) -> FetchOutcome {
        match self.clone_into_staging().await {
            Ok(status) => {
                let event_type = match status {
                    CloneStatus::Cloned => FetchEventType::Cloned,
                    CloneStatus::AlreadyExists => {
                        log::info!("{} already present in {}", self.url, self.dest.display());
                        FetchEventType::AlreadyPresent
                    }
                };
                self.notify(event_type, None);
                self.publish()
            }
            Err(e) => {
                log::error!("could not fetch {}: {}", self.url, e);
                if let Some(hint) = e.user_message() {
                    log::error!("hint: {}", hint);
                }
                self.notify(FetchEventType::Failed, Some(e.to_string()));
                FetchOutcome::Failed(e)
            }
        }
    }

    async fn clone_into_staging(&self) -> Result<CloneStatus, CloneError> {
        tokio::fs::create_dir_all(&self.staging_dir)
            .await
            .map_err(|source| CloneError::Staging {
                path: self.staging_dir.clone(),
                source,
            })?;

        self.cloner.clone_repo(&self.url, &self.dest).await
    }

    fn publish(&self) -> FetchOutcome {
        let mut job = Job::new(&self.folder, &self.url);
        match self.publisher.publish(job.clone()) {
            Ok(sequence) => {
                job.sequence = sequence;
                log::debug!("queued job {}", job);
                self.notify(FetchEventType::Queued, None);
                FetchOutcome::Queued(job)
            }
            Err(e) => {
                log::warn!("{}", e);
                FetchOutcome::NotQueued(e)
            }
        }
    }

    fn notify(&self, event_type: FetchEventType, message: Option<String>) {
        let mut event = FetchEvent::new(event_type, &self.url).with_folder(&self.folder);
        if let Some(message) = message {
            event = event.with_message(message);
        }
        self.notifications.notify(Event::Fetch(event));
    }
}
