//! Lightstrip Fake Feed
//!
//! Connects to a server's control websocket and sends an `updateColor`
//! message with a random color at a fixed interval, walking the LED
//! indices in order. Useful for watching the event stream without real
//! hardware.
//!
//! Run with: cargo run --bin lightstrip-sender -- --url ws://localhost:8080

use anyhow::Context;
use clap::Parser;
use futures_util::SinkExt;
use lightstrip::broadcast::ControlMessage;
use lightstrip::color::Color;
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lightstrip-sender")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Send random color updates to a Lightstrip server")]
struct Args {
    /// Control websocket URL
    #[arg(long, default_value = "ws://localhost:8080")]
    url: String,

    /// Number of LEDs to cycle through
    #[arg(long, default_value = "10")]
    leds: u32,

    /// Milliseconds between updates
    #[arg(long, default_value = "100")]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lightstrip_sender=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.leds > 0, "--leds must be at least 1");

    let (mut socket, _response) = connect_async(args.url.as_str())
        .await
        .with_context(|| format!("connecting to {}", args.url))?;
    tracing::info!(url = %args.url, "Connected");

    let mut ticker = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));
    let mut index: u32 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let message = ControlMessage::UpdateColor {
                    index: i64::from(index),
                    color: random_color(),
                };
                let text = serde_json::to_string(&message)?;
                tracing::debug!(%text, "Sending update");
                socket.send(Message::Text(text)).await.context("sending update")?;
                index = (index + 1) % args.leds;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, closing connection");
                socket.close(None).await.ok();
                return Ok(());
            }
        }
    }
}

/// A random color from the bytes of a fresh v4 uuid
fn random_color() -> Color {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    Color::new(bytes[0], bytes[1], bytes[2])
}
