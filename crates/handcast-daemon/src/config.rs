//! Configuration loading and validation

use anyhow::{bail, Result};
use handcast_core::{DispatchConfig, FingerClassifier, ThresholdTable, WireFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use handcast_core::dispatcher::MAX_TRACKED_HANDS;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub thresholds: ThresholdTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the WebSocket/HTTP server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Encoding of broadcast messages
    #[serde(default)]
    pub wire_format: WireFormat,
    /// Send the current bend table to clients when they connect
    #[serde(default)]
    pub snapshot_on_connect: bool,
    /// Frames buffered between ingestion and the pipeline
    #[serde(default = "default_frame_queue")]
    pub frame_queue: usize,
    /// Messages buffered per client before it starts lagging
    #[serde(default = "default_broadcast_buffer")]
    pub broadcast_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            wire_format: WireFormat::default(),
            snapshot_on_connect: false,
            frame_queue: default_frame_queue(),
            broadcast_buffer: default_broadcast_buffer(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:4439".to_string()
}

fn default_frame_queue() -> usize {
    64
}

fn default_broadcast_buffer() -> usize {
    256
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Hands processed per frame (at most 2)
    #[serde(default = "default_max_hands")]
    pub max_hands: usize,
    /// Broadcast fingertip coordinates every frame
    #[serde(default = "default_true")]
    pub stream_positions: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_hands: default_max_hands(),
            stream_positions: true,
        }
    }
}

fn default_max_hands() -> usize {
    MAX_TRACKED_HANDS
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;

        if self.server.frame_queue == 0 {
            bail!("server.frame_queue must be at least 1");
        }
        if self.server.broadcast_buffer == 0 {
            bail!("server.broadcast_buffer must be at least 1");
        }
        if self.pipeline.max_hands > MAX_TRACKED_HANDS {
            warn!(
                max_hands = self.pipeline.max_hands,
                limit = MAX_TRACKED_HANDS,
                "pipeline.max_hands above limit, extra hands will be ignored"
            );
        }
        Ok(())
    }

    /// Convert to the dispatcher settings
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            max_hands: self.pipeline.max_hands.min(MAX_TRACKED_HANDS),
            stream_positions: self.pipeline.stream_positions,
        }
    }

    pub fn classifier(&self) -> FingerClassifier {
        FingerClassifier::new(self.thresholds)
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = Config::from_toml(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Default configuration rendered as TOML
pub fn default_config_toml() -> Result<String> {
    Ok(toml::to_string_pretty(&Config::default())?)
}
