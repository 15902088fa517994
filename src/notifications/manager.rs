//! NotificationManager implementation

use crate::notifications::error::NotificationError;
use crate::notifications::event::{Event, EventFilter};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub type EventReceiver = UnboundedReceiver<Event>;

struct SubscriberInfo {
    filter: EventFilter,
    source: String,
    sender: UnboundedSender<Event>,
}

/// Shared event hub; hand it around as `Arc<NotificationManager>`
pub struct NotificationManager {
    subscribers: Mutex<HashMap<String, SubscriberInfo>>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    fn subscribers(&self) -> std::sync::MutexGuard<'_, HashMap<String, SubscriberInfo>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a subscriber; an existing subscription with the same id is replaced
    pub fn subscribe(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
    ) -> EventReceiver {
        let subscriber_id = subscriber_id.into();
        let source = source.into();
        let (sender, receiver) = unbounded_channel();

        let info = SubscriberInfo {
            filter,
            source: source.clone(),
            sender,
        };

        if let Some(existing) = self.subscribers().insert(subscriber_id.clone(), info) {
            log::warn!(
                "Subscriber '{}' replaced existing subscription (source: {} -> {})",
                subscriber_id,
                existing.source,
                source
            );
        }

        receiver
    }

    pub fn unsubscribe(&self, subscriber_id: &str) -> bool {
        self.subscribers().remove(subscriber_id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers().contains_key(subscriber_id)
    }

    /// Deliver an event to every subscriber whose filter accepts it.
    ///
    /// Subscribers whose receiver has been dropped are removed and reported
    /// in the error; delivery to the others still happens.
    pub fn publish(&self, event: Event) -> Result<(), NotificationError> {
        let mut subscribers = self.subscribers();
        let mut failed_subscribers = Vec::new();

        for (subscriber_id, info) in subscribers.iter() {
            if info.filter.accepts(&event) && info.sender.send(event.clone()).is_err() {
                failed_subscribers.push(subscriber_id.clone());
            }
        }

        for subscriber_id in &failed_subscribers {
            subscribers.remove(subscriber_id);
        }

        if failed_subscribers.is_empty() {
            Ok(())
        } else {
            Err(NotificationError::PublishFailed {
                event_type: event.kind().to_string(),
                failed_subscribers,
            })
        }
    }

    /// Publish and log (rather than return) delivery failures
    pub fn notify(&self, event: Event) {
        if let Err(e) = self.publish(event) {
            log::debug!("Notification delivery: {}", e);
        }
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::event::{FetchEvent, FetchEventType, ScanEvent, ScanEventType};

    #[test]
    fn test_filtered_delivery() {
        let manager = NotificationManager::new();
        let mut fetch_rx = manager.subscribe("fetch-watcher", EventFilter::FetchOnly, "test");
        let mut all_rx = manager.subscribe("all-watcher", EventFilter::All, "test");

        manager
            .publish(Event::Scan(ScanEvent::new(ScanEventType::Started, "repo", 1)))
            .unwrap();
        manager
            .publish(Event::Fetch(FetchEvent::new(
                FetchEventType::Failed,
                "https://github.com/x/repo",
            )))
            .unwrap();

        match fetch_rx.try_recv() {
            Ok(Event::Fetch(event)) => assert_eq!(event.event_type, FetchEventType::Failed),
            other => panic!("Expected fetch event, got {:?}", other),
        }
        assert!(fetch_rx.try_recv().is_err());

        assert!(matches!(all_rx.try_recv(), Ok(Event::Scan(_))));
        assert!(matches!(all_rx.try_recv(), Ok(Event::Fetch(_))));
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let manager = NotificationManager::new();
        let receiver = manager.subscribe("short-lived", EventFilter::All, "test");
        drop(receiver);

        let result = manager.publish(Event::Scan(ScanEvent::new(
            ScanEventType::Completed,
            "repo",
            1,
        )));

        match result {
            Err(NotificationError::PublishFailed {
                failed_subscribers, ..
            }) => assert_eq!(failed_subscribers, vec!["short-lived".to_string()]),
            other => panic!("Expected PublishFailed, got {:?}", other),
        }
        assert_eq!(manager.subscriber_count(), 0);
    }

    #[test]
    fn test_resubscribe_replaces_existing() {
        let manager = NotificationManager::new();
        let _first = manager.subscribe("watcher", EventFilter::All, "first");
        let _second = manager.subscribe("watcher", EventFilter::ScanOnly, "second");

        assert_eq!(manager.subscriber_count(), 1);
        assert!(manager.unsubscribe("watcher"));
        assert!(!manager.has_subscriber("watcher"));
    }
}
