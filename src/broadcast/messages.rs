//! Control and Broadcast Message Types
//!
//! Defines the inbound control protocol and the outbound push messages.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::strip::ColorUpdate;

/// Messages received on the control channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Set one LED to a raw color (mixed before it is stored)
    #[serde(rename = "updateColor")]
    UpdateColor {
        /// LED index, out-of-range values are ignored
        index: i64,
        /// Hex color, malformed values are read as black
        color: Color,
    },
    /// Any other `type`, accepted and ignored
    #[serde(other)]
    Unknown,
}

impl ControlMessage {
    /// Parse a control message from JSON text
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Messages pushed to every subscriber
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BroadcastMessage {
    /// An LED changed to its effective (post-mix) color
    Update { index: i64, color: Color },
}

impl BroadcastMessage {
    /// JSON body of one push-stream event
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<ColorUpdate> for BroadcastMessage {
    fn from(update: ColorUpdate) -> Self {
        BroadcastMessage::Update {
            index: update.index,
            color: update.color,
        }
    }
}
