//! # Lightstrip
//!
//! State-and-broadcast server for an addressable LED strip. Inbound color
//! updates arrive from a control websocket or from ingest adapters; each is
//! mixed through the strip's color setup, stored, and pushed to every
//! subscriber of the event stream.
//!
//! ## Modules
//!
//! - [`color`]: Color values, parsing and channel mixing
//! - [`geometry`]: Bends and the 2D layout of the strip
//! - [`strip`]: Strip state and the engine task that owns it
//! - [`broadcast`]: Subscriber hub, wire messages and stream endpoints
//! - [`adapter`]: Outbound ingest feeds
//! - [`animation`]: Named periodic animations driving the strip
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lightstrip::{serve, AppState, Config, StripEngine, StripState, SubscriberHub};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!
//!     let hub = Arc::new(SubscriberHub::new(AppState::hub_config(&config.server)));
//!     let state = StripState::new(config.strip.strip_config())?;
//!     let (engine, strip) = StripEngine::new(state, Arc::clone(&hub));
//!     engine.spawn();
//!
//!     serve(AppState::new(strip, hub, config.server.clone()), &config.server).await?;
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod animation;
pub mod api;
pub mod broadcast;
pub mod color;
pub mod config;
pub mod geometry;
pub mod strip;

// Re-export top-level types for convenience
pub use adapter::{Adapter, AdapterError, AdapterKind, FrameDecoder};

pub use animation::{Animator, ColorTransition, Easing, Pattern};

pub use api::{build_router, serve, ApiError, AppState};

pub use broadcast::{BroadcastMessage, ControlMessage, SubscriberHub};

pub use color::{mix, Color, ColorSetup};

pub use config::Config;

pub use geometry::{layout, Bend, Point};

pub use strip::{
    ColorUpdate, StripConfig, StripEngine, StripError, StripHandle, StripSnapshot, StripState,
};
