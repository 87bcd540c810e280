// src/config.rs

//! Manages client configuration: loading from TOML, defaults, and validation.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;

/// Limits on the read path: the receive buffer handed to the socket and the
/// bound on a single encoded snapshot.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LimitsConfig {
    /// Initial capacity of the read-side accumulation buffer.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
    /// Upper bound for one encoded snapshot. A frame advertising more than
    /// this is treated as a fatal protocol error.
    #[serde(default = "default_max_snapshot_size")]
    pub max_snapshot_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: default_read_buffer_size(),
            max_snapshot_size: default_max_snapshot_size(),
        }
    }
}

fn default_read_buffer_size() -> usize {
    8 * 1024
}
fn default_max_snapshot_size() -> usize {
    crate::core::protocol::DEFAULT_MAX_SNAPSHOT_SIZE
}

/// Configuration of the snapshot hand-off channel.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChannelConfig {
    /// Queue depth before the drop-oldest policy kicks in.
    #[serde(default = "default_snapshot_capacity")]
    pub snapshot_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            snapshot_capacity: default_snapshot_capacity(),
        }
    }
}

fn default_snapshot_capacity() -> usize {
    crate::client::DEFAULT_SNAPSHOT_CAPACITY
}

/// The top-level client configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            limits: LimitsConfig::default(),
            channel: ChannelConfig::default(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    3456
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Loads and validates the configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            bail!("host must not be empty");
        }
        if self.port == 0 {
            bail!("port must be non-zero");
        }
        if self.channel.snapshot_capacity == 0 {
            bail!("channel.snapshot_capacity must be at least 1");
        }
        if self.limits.max_snapshot_size == 0 {
            bail!("limits.max_snapshot_size must be non-zero");
        }
        if self.limits.read_buffer_size == 0 {
            bail!("limits.read_buffer_size must be non-zero");
        }
        Ok(())
    }
}
