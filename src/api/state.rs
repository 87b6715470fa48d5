//! Application State
//!
//! Shared state accessible by all handlers.
//! Wrapped in Arc for sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::broadcast::{HubConfig, SubscriberHub};
use crate::config::ServerConfig;
use crate::strip::StripHandle;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Handle to the strip engine (the only writer of strip state)
    pub strip: StripHandle,
    /// Push-stream subscribers
    pub hub: Arc<SubscriberHub>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state around an existing engine handle and hub
    pub fn new(strip: StripHandle, hub: Arc<SubscriberHub>, config: ServerConfig) -> Self {
        Self {
            strip,
            hub,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Hub configuration derived from the server config
    pub fn hub_config(config: &ServerConfig) -> HubConfig {
        HubConfig {
            max_subscribers: config.max_subscribers,
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get push-stream subscriber count
    pub async fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count().await
    }
}
