//! Subscriber Hub
//!
//! Tracks every live push-stream subscriber and fans updates out to them.
//! Each subscriber is an unbounded channel drained by its own connection
//! task, so a broadcast never waits on a slow socket.

use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::BroadcastMessage;

/// Unique identifier for a subscriber connection
pub type SubscriberId = String;

/// Fan-out set of push-stream subscribers
pub struct SubscriberHub {
    /// Active subscribers: SubscriberId → message sender
    subscribers: RwLock<HashMap<SubscriberId, mpsc::UnboundedSender<BroadcastMessage>>>,
    /// Configuration
    config: HubConfig,
}

/// Configuration for the subscriber hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent subscribers, unbounded when `None`
    pub max_subscribers: Option<usize>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_subscribers: None,
        }
    }
}

impl SubscriberHub {
    /// Create a new hub
    pub fn new(config: HubConfig) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register a new subscriber
    ///
    /// Returns the subscriber ID, or an error if a configured limit has
    /// been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<BroadcastMessage>,
    ) -> Result<SubscriberId, HubError> {
        let mut subscribers = self.subscribers.write().await;
        if let Some(max) = self.config.max_subscribers {
            if subscribers.len() >= max {
                return Err(HubError::TooManySubscribers(max));
            }
        }

        let id = Uuid::new_v4().to_string();
        subscribers.insert(id.clone(), sender);

        tracing::info!(subscriber_id = %id, total = subscribers.len(), "Subscriber connected");
        Ok(id)
    }

    /// Remove a subscriber. Unknown IDs are ignored.
    pub async fn unregister(&self, id: &str) {
        if self.subscribers.write().await.remove(id).is_some() {
            tracing::info!(subscriber_id = %id, "Subscriber disconnected");
        }
    }

    /// Deliver `message` to every subscriber.
    ///
    /// A subscriber whose channel is closed is dropped from the set; the
    /// rest still receive the message. Returns the number of deliveries.
    pub async fn broadcast(&self, message: &BroadcastMessage) -> usize {
        let mut subscribers = self.subscribers.write().await;

        let mut failed = Vec::new();
        let mut delivered = 0;
        for (id, sender) in subscribers.iter() {
            if sender.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                failed.push(id.clone());
            }
        }

        for id in failed {
            subscribers.remove(&id);
            tracing::debug!(subscriber_id = %id, "Dropped subscriber after failed write");
        }

        tracing::trace!(subscribers = delivered, "Broadcast update");
        delivered
    }

    /// Get the current subscriber count
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

impl Default for SubscriberHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

/// Errors that can occur in the subscriber hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many subscribers (limit: {0})")]
    TooManySubscribers(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn update(index: i64) -> BroadcastMessage {
        BroadcastMessage::Update {
            index,
            color: Color::new(255, 0, 0),
        }
    }

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();
        assert_eq!(config.max_subscribers, None);
    }

    #[tokio::test]
    async fn test_default_hub_is_unbounded() {
        let hub = SubscriberHub::default();
        let mut receivers = Vec::new();
        for _ in 0..1500 {
            let (tx, rx) = mpsc::unbounded_channel();
            hub.register(tx).await.unwrap();
            receivers.push(rx);
        }
        assert_eq!(hub.subscriber_count().await, 1500);
        assert_eq!(hub.broadcast(&update(0)).await, 1500);
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = SubscriberHub::default();
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(hub.subscriber_count().await, 1);

        hub.unregister(&id).await;
        assert_eq!(hub.subscriber_count().await, 0);

        // Second removal is a no-op
        hub.unregister(&id).await;
        assert_eq!(hub.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_subscriber_limit() {
        let hub = SubscriberHub::new(HubConfig {
            max_subscribers: Some(2),
        });

        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let (tx3, _rx3) = mpsc::unbounded_channel();

        hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();
        let result = hub.register(tx3).await;

        assert!(matches!(result, Err(HubError::TooManySubscribers(2))));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_subscriber() {
        let hub = SubscriberHub::default();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = mpsc::unbounded_channel();
            hub.register(tx).await.unwrap();
            receivers.push(rx);
        }

        let delivered = hub.broadcast(&update(5)).await;
        assert_eq!(delivered, 3);

        for rx in receivers.iter_mut() {
            assert_eq!(rx.try_recv().unwrap(), update(5));
        }
    }

    #[tokio::test]
    async fn test_broadcast_isolates_failed_subscriber() {
        let hub = SubscriberHub::default();

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();
        hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();
        hub.register(tx3).await.unwrap();

        // Closing the receiver makes every write to it fail
        drop(rx2);

        let delivered = hub.broadcast(&update(1)).await;
        assert_eq!(delivered, 2);
        assert_eq!(hub.subscriber_count().await, 2);
        assert_eq!(rx1.try_recv().unwrap(), update(1));
        assert_eq!(rx3.try_recv().unwrap(), update(1));
    }
}
