//! Event types for the notification system

use std::time::SystemTime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchEventType {
    /// URL validated, clone task spawned
    Accepted,
    /// Clone finished and produced a fresh checkout
    Cloned,
    /// Destination already held a checkout; treated as success
    AlreadyPresent,
    /// Clone failed; no job will be produced
    Failed,
    /// Job handed to the scan queue
    Queued,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanEventType {
    Started,
    /// A single file was unreadable or had an over-long line
    FileSkipped,
    /// A file opened an import block that never closed; no record produced
    UnterminatedImportBlock,
    Completed,
    /// The whole scan was abandoned (walk failure or no candidate files)
    Error,
}

#[derive(Clone, Debug)]
pub struct FetchEvent {
    pub event_type: FetchEventType,
    pub timestamp: SystemTime,
    pub url: String,
    pub folder: Option<String>,
    pub message: Option<String>,
}

impl FetchEvent {
    pub fn new(event_type: FetchEventType, url: impl Into<String>) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            url: url.into(),
            folder: None,
            message: None,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct ScanEvent {
    pub event_type: ScanEventType,
    pub timestamp: SystemTime,
    /// Folder of the job being scanned
    pub job: String,
    pub sequence: u64,
    pub message: Option<String>,
}

impl ScanEvent {
    pub fn new(event_type: ScanEventType, job: impl Into<String>, sequence: u64) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            job: job.into(),
            sequence,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Any event that can be published
#[derive(Clone, Debug)]
pub enum Event {
    Fetch(FetchEvent),
    Scan(ScanEvent),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Fetch(_) => "Fetch",
            Event::Scan(_) => "Scan",
        }
    }
}

/// Which events a subscriber wants to see
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFilter {
    All,
    FetchOnly,
    ScanOnly,
}

impl EventFilter {
    pub fn accepts(&self, event: &Event) -> bool {
        matches!(
            (self, event),
            (EventFilter::All, _)
                | (EventFilter::FetchOnly, Event::Fetch(_))
                | (EventFilter::ScanOnly, Event::Scan(_))
        )
    }
}
