// src/config.rs
//! Session configuration
//!
//! A session resolves its platform and profile exactly once; the knobs here
//! are therefore fixed at open time and never hot-reloaded. Files are TOML,
//! with a `RIO_*` environment overlay for deployment overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Built-in defaults
pub mod constants {
    /// Max time to wait for InitDone after starting the fabric.
    pub const DEFAULT_START_TIMEOUT_MS: u64 = 5_000;
    /// Interval between InitDone polls.
    pub const DEFAULT_INIT_POLL_INTERVAL_MS: u64 = 5;
    /// Host-side FIFO depth, in blocks per channel.
    pub const DEFAULT_HOST_BUFFER_BLOCKS: usize = 16;
    /// Drain pass cap for `clean`.
    pub const DEFAULT_DRAIN_MAX_PASSES: usize = 4_096;
}

/// Complete configuration for one device session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// VI version the bitfile is expected to declare, as `"M.m"`. `None`
    /// skips the cross-check.
    #[serde(default)]
    pub expected_vi_version: Option<String>,

    #[serde(default = "defaults::start_timeout_ms")]
    pub start_timeout_ms: u64,

    #[serde(default = "defaults::init_poll_interval_ms")]
    pub init_poll_interval_ms: u64,

    /// Whether closing the session resets the fabric.
    #[serde(default = "defaults::reset_on_close")]
    pub reset_on_close: bool,

    #[serde(default)]
    pub dma: DmaConfig,
}

/// DMA engine knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmaConfig {
    #[serde(default = "defaults::host_buffer_blocks")]
    pub host_buffer_blocks: usize,

    #[serde(default = "defaults::drain_max_passes")]
    pub drain_max_passes: usize,
}

mod defaults {
    use super::constants::*;

    pub fn start_timeout_ms() -> u64 {
        DEFAULT_START_TIMEOUT_MS
    }

    pub fn init_poll_interval_ms() -> u64 {
        DEFAULT_INIT_POLL_INTERVAL_MS
    }

    pub fn reset_on_close() -> bool {
        true
    }

    pub fn host_buffer_blocks() -> usize {
        DEFAULT_HOST_BUFFER_BLOCKS
    }

    pub fn drain_max_passes() -> usize {
        DEFAULT_DRAIN_MAX_PASSES
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expected_vi_version: None,
            start_timeout_ms: defaults::start_timeout_ms(),
            init_poll_interval_ms: defaults::init_poll_interval_ms(),
            reset_on_close: defaults::reset_on_close(),
            dma: DmaConfig::default(),
        }
    }
}

impl Default for DmaConfig {
    fn default() -> Self {
        Self {
            host_buffer_blocks: defaults::host_buffer_blocks(),
            drain_max_passes: defaults::drain_max_passes(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl SessionConfig {
    /// Load from a TOML file, with `RIO_*` environment variables overlaid
    /// (e.g. `RIO_START_TIMEOUT_MS`, `RIO_DMA__DRAIN_MAX_PASSES`).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("RIO").separator("__"))
            .build()?;

        let loaded: SessionConfig = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dma.host_buffer_blocks == 0 {
            return Err(ConfigError::Invalid(
                "dma.host_buffer_blocks must be at least 1".to_string(),
            ));
        }
        if self.dma.drain_max_passes == 0 {
            return Err(ConfigError::Invalid(
                "dma.drain_max_passes must be at least 1".to_string(),
            ));
        }
        if self.init_poll_interval_ms > self.start_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "init_poll_interval_ms ({}) exceeds start_timeout_ms ({})",
                self.init_poll_interval_ms, self.start_timeout_ms
            )));
        }
        Ok(())
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms)
    }

    pub fn init_poll_interval(&self) -> Duration {
        Duration::from_millis(self.init_poll_interval_ms)
    }
}
