//! Ingest Adapters
//!
//! Each adapter connects outward to one lighting-control feed, decodes the
//! frames it receives into [`ColorUpdate`]s and hands them to a callback.
//!
//! ## Lifecycle
//!
//! `connect → receiving* → closed`. A bad frame is logged and dropped
//! without closing the connection. A transport error or a close from the
//! peer ends the connection for good: adapters do not reconnect.
//!
//! ## Protocols
//!
//! | Kind        | Decoder        |
//! |-------------|----------------|
//! | `websocket` | [`JsonFrames`] |
//! | `artnet`    | [`JsonFrames`] |
//! | `e131`      | [`E131Frames`] |

mod decode;

pub use decode::{
    decode_json_frame, decode_update, normalize, DecodeError, E131Frames, Frame, FrameDecoder,
    JsonFrames,
};

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::strip::ColorUpdate;

/// Callback invoked for every decoded update
pub type UpdateCallback = Arc<dyn Fn(ColorUpdate) + Send + Sync>;

/// Supported ingest protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Plain websocket JSON feed
    Websocket,
    /// ArtNet-style feed bridged over websocket
    ArtNet,
    /// E1.31-style feed bridged over websocket
    E131,
}

impl AdapterKind {
    /// Decode strategy for this protocol
    pub fn decoder(&self) -> Arc<dyn FrameDecoder> {
        match self {
            AdapterKind::Websocket | AdapterKind::ArtNet => Arc::new(JsonFrames),
            AdapterKind::E131 => Arc::new(E131Frames),
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdapterKind::Websocket => "websocket",
            AdapterKind::ArtNet => "artnet",
            AdapterKind::E131 => "e131",
        };
        f.write_str(name)
    }
}

/// Errors raised while establishing an adapter connection
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
}

/// A live connection to an ingest feed.
///
/// Dropping the adapter closes the connection.
pub struct Adapter {
    url: String,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Adapter {
    /// Connect to `url` with the decoder for `kind`
    pub async fn connect_kind<F>(
        kind: AdapterKind,
        url: &str,
        on_update: F,
    ) -> Result<Self, AdapterError>
    where
        F: Fn(ColorUpdate) + Send + Sync + 'static,
    {
        Self::connect(url, kind.decoder(), on_update).await
    }

    /// Connect to `url` and start delivering decoded updates to `on_update`
    pub async fn connect<F>(
        url: &str,
        decoder: Arc<dyn FrameDecoder>,
        on_update: F,
    ) -> Result<Self, AdapterError>
    where
        F: Fn(ColorUpdate) + Send + Sync + 'static,
    {
        let (stream, _response) = connect_async(url).await.map_err(|source| AdapterError::Connect {
            url: url.to_string(),
            source,
        })?;

        tracing::info!(url = %url, protocol = decoder.name(), "Adapter connected");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let on_update: UpdateCallback = Arc::new(on_update);
        let task = tokio::spawn(receive_loop(
            stream,
            url.to_string(),
            decoder,
            on_update,
            shutdown_rx,
        ));

        Ok(Self {
            url: url.to_string(),
            shutdown: Some(shutdown_tx),
            task,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Close the connection. Later calls have no effect.
    pub fn close(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // The receive loop may already have ended on its own
            let _ = shutdown.send(());
            tracing::debug!(url = %self.url, "Adapter close requested");
        }
    }

    /// True once the connection has ended, by `close` or otherwise
    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn receive_loop(
    stream: WsStream,
    url: String,
    decoder: Arc<dyn FrameDecoder>,
    on_update: UpdateCallback,
    mut shutdown: oneshot::Receiver<()>,
) {
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                if let Err(e) = sink.send(Message::Close(None)).await {
                    tracing::debug!(url = %url, error = %e, "Close handshake failed");
                }
                break;
            }
            next = source.next() => match next {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(message)) => {
                    if let Some(frame) = to_frame(message) {
                        handle_frame(decoder.as_ref(), frame, &url, &on_update);
                    }
                }
                Some(Err(e)) => {
                    tracing::error!(url = %url, error = %e, "Adapter transport error");
                    break;
                }
            }
        }
    }

    tracing::info!(url = %url, "Adapter connection closed");
}

/// Map a websocket message to a payload frame; control frames carry none
fn to_frame(message: Message) -> Option<Frame> {
    match message {
        Message::Text(text) => Some(Frame::Text(text)),
        Message::Binary(bytes) => Some(Frame::Binary(bytes)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) => None,
        Message::Frame(_) => Some(Frame::Other("raw frame")),
    }
}

fn handle_frame(decoder: &dyn FrameDecoder, frame: Frame, url: &str, on_update: &UpdateCallback) {
    match decode_update(decoder, frame) {
        Ok(Some(update)) => on_update(update),
        Ok(None) => tracing::debug!(url = %url, "Ignored non-update message"),
        Err(e) => tracing::warn!(
            url = %url,
            protocol = decoder.name(),
            error = %e,
            "Dropped frame"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    const RED_AT_2: &str = r##"{"index":2,"color":"#ff0000"}"##;

    /// Serve one websocket client: send `frames`, then hold the connection
    /// until the client closes it
    async fn feed(frames: Vec<Message>) -> (String, JoinHandle<bool>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            for frame in frames {
                ws.send(frame).await.unwrap();
            }
            // Report whether the client sent a close frame
            while let Some(Ok(message)) = ws.next().await {
                if message.is_close() {
                    return true;
                }
            }
            false
        });

        (url, server)
    }

    async fn wait_closed(adapter: &Adapter) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !adapter.is_closed() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("adapter did not close");
    }

    #[tokio::test]
    async fn test_delivers_updates_and_survives_bad_frames() {
        let (url, server) = feed(vec![
            Message::Text(RED_AT_2.to_string()),
            Message::Binary(RED_AT_2.as_bytes().to_vec()),
            Message::Text("garbage".to_string()),
            Message::Binary(vec![0xff, 0x00]),
            Message::Text(r##"{"type":"updateColor","index":3,"color":"#00ff00"}"##.to_string()),
        ])
        .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut adapter = Adapter::connect_kind(AdapterKind::Websocket, &url, move |update| {
            let _ = tx.send(update);
        })
        .await
        .unwrap();

        let red = ColorUpdate::new(2, Color::new(255, 0, 0));
        assert_eq!(rx.recv().await.unwrap(), red);
        assert_eq!(rx.recv().await.unwrap(), red);
        assert_eq!(
            rx.recv().await.unwrap(),
            ColorUpdate::new(3, Color::new(0, 255, 0))
        );
        assert!(!adapter.is_closed());

        adapter.close();
        adapter.close();
        wait_closed(&adapter).await;
        assert!(server.await.unwrap());
    }

    #[tokio::test]
    async fn test_peer_close_ends_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text(RED_AT_2.to_string())).await.unwrap();
            ws.close(None).await.unwrap();
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut adapter = Adapter::connect_kind(AdapterKind::E131, &url, move |update| {
            let _ = tx.send(update);
        })
        .await
        .unwrap();

        assert_eq!(rx.recv().await.unwrap().index, 2);
        wait_closed(&adapter).await;

        // Closing an already closed adapter is harmless
        adapter.close();
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        drop(listener);

        let result = Adapter::connect_kind(AdapterKind::ArtNet, &url, |_| {}).await;
        assert!(matches!(result, Err(AdapterError::Connect { .. })));
    }

    #[test]
    fn test_kind_decoders() {
        assert_eq!(AdapterKind::Websocket.decoder().name(), "json");
        assert_eq!(AdapterKind::ArtNet.decoder().name(), "json");
        assert_eq!(AdapterKind::E131.decoder().name(), "e131");
    }

    #[test]
    fn test_kind_serde() {
        let kind: AdapterKind = serde_json::from_str("\"artnet\"").unwrap();
        assert_eq!(kind, AdapterKind::ArtNet);
        assert_eq!(AdapterKind::E131.to_string(), "e131");
    }
}
