//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::adapter::AdapterKind;
use crate::color::ColorSetup;
use crate::geometry::Bend;
use crate::strip::StripConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub strip: StripSettings,

    #[serde(default)]
    pub adapters: Vec<AdapterConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// File served verbatim on `/kitchen-sink` instead of the bundled page
    #[serde(default)]
    pub asset_path: Option<PathBuf>,

    /// Cap on concurrent push-stream subscribers, unbounded when unset
    #[serde(default)]
    pub max_subscribers: Option<usize>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            asset_path: None,
            max_subscribers: None,
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Strip geometry and color configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StripSettings {
    #[serde(default = "default_length")]
    pub length: f64,

    #[serde(default = "default_num_leds")]
    pub num_leds: usize,

    /// Defaults to `num_leds`
    pub addressable_leds: Option<usize>,

    #[serde(default)]
    pub bends: Vec<Bend>,

    #[serde(default)]
    pub color_setup: ColorSetup,
}

fn default_length() -> f64 {
    100.0
}

fn default_num_leds() -> usize {
    10
}

impl Default for StripSettings {
    fn default() -> Self {
        Self {
            length: default_length(),
            num_leds: default_num_leds(),
            addressable_leds: None,
            bends: Vec::new(),
            color_setup: ColorSetup::default(),
        }
    }
}

impl StripSettings {
    pub fn strip_config(&self) -> StripConfig {
        StripConfig::new(
            self.length,
            self.num_leds,
            self.addressable_leds.unwrap_or(self.num_leds),
        )
    }
}

/// One ingest feed to connect to at startup
#[derive(Debug, Clone, Deserialize)]
pub struct AdapterConfig {
    pub kind: AdapterKind,
    pub url: String,
    #[serde(default = "default_adapter_enabled")]
    pub enabled: bool,
}

fn default_adapter_enabled() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("lightstrip").join("config.toml")),
            Some(PathBuf::from("/etc/lightstrip/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(host) = var("LIGHTSTRIP_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("LIGHTSTRIP_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(path) = var("LIGHTSTRIP_ASSET_PATH") {
            self.server.asset_path = Some(PathBuf::from(path));
        }

        // Strip overrides
        if let Some(num_leds) = var("LIGHTSTRIP_NUM_LEDS").and_then(|n| n.parse().ok()) {
            self.strip.num_leds = num_leds;
        }
        if let Some(length) = var("LIGHTSTRIP_LENGTH").and_then(|l| l.parse().ok()) {
            self.strip.length = length;
        }

        // Logging overrides
        if let Some(level) = var("LIGHTSTRIP_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("LIGHTSTRIP_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r##"# Lightstrip Configuration
#
# Environment variables override these settings:
# - LIGHTSTRIP_HOST
# - LIGHTSTRIP_PORT
# - LIGHTSTRIP_ASSET_PATH
# - LIGHTSTRIP_NUM_LEDS
# - LIGHTSTRIP_LENGTH
# - LIGHTSTRIP_LOG_LEVEL
# - LIGHTSTRIP_LOG_FORMAT

[server]
# Host and port for the control socket, push stream and HTTP API
host = "0.0.0.0"
port = 8080

# Serve this file on /kitchen-sink instead of the bundled page
# asset_path = "/srv/lightstrip/kitchen-sink.html"

# Cap on concurrent push-stream subscribers (unbounded when unset)
# max_subscribers = 1000

[strip]
# Path length of the strip (any unit, used for layout)
length = 100.0

# Number of LEDs on the strip
num_leds = 10

# Number of individually settable LEDs (defaults to num_leds)
# addressable_leds = 10

# Bends along the path, applied in order
# [[strip.bends]]
# length = 50.0
# angle = 90.0

# Per-channel attenuation (0 = off, 255 = pass-through)
[strip.color_setup]
channels = [
    { name = "Red", value = 255 },
    { name = "Green", value = 255 },
    { name = "Blue", value = 255 },
]

# Ingest feeds (kind: websocket, artnet, e131)
# [[adapters]]
# kind = "artnet"
# url = "ws://localhost:6454"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"##
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert_eq!(config.strip.num_leds, 10);
        assert_eq!(config.strip.color_setup, ColorSetup::pass_through());
        assert!(config.adapters.is_empty());
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.server.asset_path, None);
        assert_eq!(config.server.max_subscribers, None);
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.strip.color_setup, ColorSetup::pass_through());
        assert_eq!(config.strip.strip_config().addressable_leds, 10);
        assert_eq!(config.server.asset_path, None);
        assert_eq!(config.server.max_subscribers, None);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [server]
            port = 9000
            max_subscribers = 50

            [strip]
            length = 12.0
            num_leds = 12
            addressable_leds = 6
            bends = [{ length = 1.0, angle = 30.0 }, { length = 1.0, angle = 30.0 }]

            [strip.color_setup]
            channels = [{ name = "Red", value = 0 }, { name = "Green", value = 0 }, { name = "Blue", value = 0 }]

            [[adapters]]
            kind = "e131"
            url = "ws://localhost:5568"

            [[adapters]]
            kind = "websocket"
            url = "ws://localhost:9001"
            enabled = false
        "#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.max_subscribers, Some(50));
        assert_eq!(config.strip.bends.len(), 2);
        assert_eq!(config.strip.color_setup, ColorSetup::muted());
        assert_eq!(config.strip.strip_config(), StripConfig::new(12.0, 12, 6));
        assert_eq!(config.adapters.len(), 2);
        assert_eq!(config.adapters[0].kind, AdapterKind::E131);
        assert!(config.adapters[0].enabled);
        assert!(!config.adapters[1].enabled);
    }

    #[test]
    fn test_parse_error() {
        let result = Config::parse("[server]\nport = \"not a port\"");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));

        let result = Config::parse("[[adapters]]\nkind = \"dmx\"\nurl = \"ws://x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[strip]\nnum_leds = 42").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.strip.num_leds, 42);

        let missing = Config::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LIGHTSTRIP_PORT", "9999"),
            ("LIGHTSTRIP_NUM_LEDS", "64"),
            ("LIGHTSTRIP_LENGTH", "not a number"),
            ("LIGHTSTRIP_LOG_FORMAT", "json"),
            ("LIGHTSTRIP_ASSET_PATH", "/srv/page.html"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.strip.num_leds, 64);
        assert_eq!(config.strip.length, 100.0);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.server.asset_path, Some(PathBuf::from("/srv/page.html")));
    }
}
