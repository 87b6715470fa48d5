//! Broadcast Server
//!
//! Accepts control messages that change the strip and pushes every
//! resulting change to all live subscribers.
//!
//! ## Architecture
//!
//! - **SubscriberHub**: the fan-out set of push-stream subscribers
//! - **Handler**: control socket and push-stream endpoints
//! - **Messages**: control and broadcast message formats
//!
//! ## Protocol
//!
//! Control (websocket, inbound):
//! `{"type":"updateColor","index":3,"color":"#ff0000"}`
//!
//! Broadcast (event stream, outbound):
//! `data: {"type":"update","index":3,"color":"#ff0000"}`
//!
//! The broadcast color is the effective one, after the strip's color
//! setup has been applied.

mod handler;
mod hub;
mod messages;

pub use handler::{dispatch_control, stream_handler, subscribe};
pub use hub::{HubConfig, HubError, SubscriberHub, SubscriberId};
pub use messages::{BroadcastMessage, ControlMessage};
