//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::defaults::{
    default_api_base, default_concurrency, default_db_path, default_delivery_timeout,
    default_interval, default_platforms, default_probe_timeout, default_user_agent,
};
use crate::state::{MentionMode, Platform};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Poll loop tuning.
    #[serde(default)]
    pub poll: PollConfig,
    /// Probe HTTP settings.
    #[serde(default)]
    pub probe: ProbeConfig,
    /// Notification delivery.
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Prometheus endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Channels registered at startup if not already tracked.
    #[serde(default, rename = "channel")]
    pub channels: Vec<ChannelBlock>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    /// Volatile; live state is lost on restart.
    Memory,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Path to SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_db_path(),
        }
    }
}

/// Poll loop configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Seconds between cycle starts (default: 60).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Channels probed concurrently within a platform group (default: 1).
    /// Readings are still applied in listing order.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-probe timeout; a timeout counts as a probe failure (default: 10).
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    /// Per-delivery timeout (default: 10).
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_secs: u64,
    /// Platform groups polled each cycle, in order.
    #[serde(default = "default_platforms")]
    pub platforms: Vec<Platform>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            concurrency: default_concurrency(),
            probe_timeout_secs: default_probe_timeout(),
            delivery_timeout_secs: default_delivery_timeout(),
            platforms: default_platforms(),
        }
    }
}

/// Probe HTTP client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

/// Where notifications go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Discord REST API (bot token).
    Discord,
    /// Log only; nothing leaves the process.
    #[default]
    Log,
}

/// Delivery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub kind: SinkKind,
    /// Bot token. Falls back to `LIVEWATCH_DISCORD_TOKEN`.
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            token: None,
            api_base: default_api_base(),
        }
    }
}

impl DeliveryConfig {
    pub const TOKEN_ENV: &'static str = "LIVEWATCH_DISCORD_TOKEN";

    /// Configured token, or the environment fallback.
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(Self::TOKEN_ENV).ok().filter(|t| !t.is_empty()))
    }
}

/// Prometheus HTTP endpoint configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Listen port; absent or 0 disables the endpoint.
    pub port: Option<u16>,
}

/// A `[[channel]]` bootstrap block.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelBlock {
    pub name: String,
    pub platform: Platform,
    pub notify_target: u64,
    #[serde(default)]
    pub mention: MentionMode,
    #[serde(default)]
    pub subscribers: Vec<u64>,
}
