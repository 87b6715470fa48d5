//! Lightstrip Server
//!
//! Run with: cargo run --bin lightstrip
//!
//! # Configuration
//!
//! Read from `--config`, or else the first of
//! `~/.config/lightstrip/config.toml`, `/etc/lightstrip/config.toml` and
//! `./config.toml`. Environment variables override the file:
//! - `LIGHTSTRIP_HOST`, `LIGHTSTRIP_PORT`: bind address (default: 0.0.0.0:8080)
//! - `LIGHTSTRIP_NUM_LEDS`, `LIGHTSTRIP_LENGTH`: strip dimensions
//! - `LIGHTSTRIP_ASSET_PATH`: page served on /kitchen-sink
//! - `LIGHTSTRIP_LOG_LEVEL`, `LIGHTSTRIP_LOG_FORMAT`: logging (`pretty` or `json`)
//! - `RUST_LOG`: takes precedence over the configured level

use anyhow::Context;
use clap::{Parser, Subcommand};
use lightstrip::adapter::Adapter;
use lightstrip::api::{serve, AppState};
use lightstrip::broadcast::SubscriberHub;
use lightstrip::config::{generate_default_config, Config, LoggingConfig};
use lightstrip::strip::{StripEngine, StripHandle, StripState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "lightstrip")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LED strip state and broadcast server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a default config file
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config) = cli.command {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config.logging);

    tracing::info!("Starting Lightstrip v{}", env!("CARGO_PKG_VERSION"));

    let state = StripState::new(config.strip.strip_config())
        .context("invalid strip configuration")?
        .with_bends(config.strip.bends.clone())
        .with_color_setup(config.strip.color_setup.clone());
    tracing::info!(
        num_leds = state.num_leds(),
        length = state.config().length,
        bends = state.bends().len(),
        "Strip initialized"
    );

    let hub = Arc::new(SubscriberHub::new(AppState::hub_config(&config.server)));
    let (engine, strip) = StripEngine::new(state, Arc::clone(&hub));
    let engine_task = engine.spawn();

    let mut adapters = connect_adapters(&config, &strip).await;

    serve(AppState::new(strip, hub, config.server.clone()), &config.server).await?;

    for adapter in adapters.iter_mut() {
        adapter.close();
    }
    engine_task.abort();

    tracing::info!("Lightstrip stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("lightstrip={},tower_http=info", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connect every enabled adapter. A feed that cannot be reached is logged
/// and skipped.
async fn connect_adapters(config: &Config, strip: &StripHandle) -> Vec<Adapter> {
    let mut adapters = Vec::new();

    for adapter_config in config.adapters.iter().filter(|a| a.enabled) {
        let strip = strip.clone();
        let on_update = move |update| {
            strip.submit(update);
        };
        let result =
            Adapter::connect_kind(adapter_config.kind, &adapter_config.url, on_update).await;

        match result {
            Ok(adapter) => adapters.push(adapter),
            Err(e) => tracing::warn!(
                kind = %adapter_config.kind,
                url = %adapter_config.url,
                error = %e,
                "Adapter unavailable, continuing without it"
            ),
        }
    }

    adapters
}
