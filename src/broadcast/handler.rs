//! Control Socket and Push Stream Handlers
//!
//! One entry point serves both sides of the broadcast server: a websocket
//! upgrade request becomes a control channel, any other request becomes a
//! push-stream subscription.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
};
use futures_util::{stream, Stream};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::{SubscriberHub, SubscriberId};
use super::messages::{BroadcastMessage, ControlMessage};
use crate::api::{ApiError, AppState};
use crate::strip::{ColorUpdate, StripHandle};

/// Control socket or push-stream subscription, depending on the request
pub async fn stream_handler(
    ws: Option<WebSocketUpgrade>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match ws {
        Some(ws) => {
            let strip = state.strip.clone();
            ws.on_upgrade(move |socket| handle_control_socket(socket, strip))
        }
        None => match subscribe(&state).await {
            Ok(sse) => sse.into_response(),
            Err(e) => e.into_response(),
        },
    }
}

/// Register a push-stream subscriber.
///
/// Every broadcast is framed as `data: <json>\n\n`. The subscriber is
/// removed from the hub when the client disconnects and the stream is
/// dropped.
pub async fn subscribe(
    state: &AppState,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let (tx, rx) = mpsc::unbounded_channel::<BroadcastMessage>();

    let id = state.hub.register(tx).await?;

    let subscription = Subscription {
        id,
        hub: Arc::clone(&state.hub),
    };

    let events = stream::unfold((rx, subscription), |(mut rx, subscription)| async move {
        let message = rx.recv().await?;
        let event = message
            .to_json()
            .map(|json| Event::default().data(json))
            .map_err(axum::Error::new);
        Some((event, (rx, subscription)))
    });

    Ok(Sse::new(events))
}

/// Removes its subscriber from the hub when dropped
struct Subscription {
    id: SubscriberId,
    hub: Arc<SubscriberHub>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let hub = Arc::clone(&self.hub);
        let id = std::mem::take(&mut self.id);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                hub.unregister(&id).await;
            });
        }
    }
}

/// Read control messages until the client goes away
async fn handle_control_socket(mut socket: WebSocket, strip: StripHandle) {
    tracing::info!("Control channel connected");

    while let Some(result) = socket.recv().await {
        match result {
            Ok(message) => {
                if !handle_ws_message(&strip, message) {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Control channel receive error");
                break;
            }
        }
    }

    tracing::info!("Control channel disconnected");
}

/// Handle one websocket message.
///
/// Returns false if the connection should be closed.
fn handle_ws_message(strip: &StripHandle, message: Message) -> bool {
    match message {
        Message::Text(text) => {
            dispatch_control(strip, &text);
            true
        }
        Message::Binary(bytes) => {
            match String::from_utf8(bytes) {
                Ok(text) => {
                    dispatch_control(strip, &text);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Dropped non UTF-8 control message");
                }
            }
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!("Client requested close");
            false
        }
    }
}

/// Parse one control message and submit it to the strip.
///
/// Malformed messages are logged and dropped; unknown types are ignored.
/// Returns the raw update that was submitted, if any.
pub fn dispatch_control(strip: &StripHandle, text: &str) -> Option<ColorUpdate> {
    match ControlMessage::parse(text) {
        Ok(ControlMessage::UpdateColor { index, color }) => {
            let update = ColorUpdate::new(index, color);
            strip.submit(update).then_some(update)
        }
        Ok(ControlMessage::Unknown) => {
            tracing::debug!(text = %text, "Ignored control message of unknown type");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, text = %text, "Invalid control message");
            None
        }
    }
}
