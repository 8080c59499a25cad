//! Configuration module for vertex-pipeline
//!
//! Render settings are stored as TOML. The default location is the
//! platform-appropriate config directory:
//!
//! - **Linux**: `~/.config/vertex-pipeline/config.toml`
//! - **macOS**: `~/Library/Application Support/vertex-pipeline/config.toml`
//! - **Windows**: `%APPDATA%\vertex-pipeline\config.toml`
//!
//! Every field has a default, so a partial (or empty) file is valid.
//!
//! # Example
//!
//! ```ignore
//! use vertex_pipeline::config::RenderConfig;
//!
//! let config = RenderConfig::load_or_default(RenderConfig::default_path().unwrap());
//! config.apply(&mut state);
//! ```

use crate::error::{Error, Result};
use crate::pipeline::{RenderModes, RenderState};
use crate::types::rgba;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "vertex-pipeline";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default number of vertices per mesher batch
pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,vertex_pipeline=debug";

/// Get the default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

/// Batch mesher settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Worker thread count
    pub threads: usize,
    /// Vertices per batch
    pub batch_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl WorkerConfig {
    /// Thread count, at least 1
    pub fn effective_threads(&self) -> usize {
        self.threads.max(1)
    }

    /// Batch size, at least 1
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

/// Render settings applied to every worker's context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Packed RGBA base colour; white means untinted
    pub base_colour: u32,
    pub alpha_override: Option<u8>,
    pub log_filter: String,
    // Tables last so the TOML output stays flat-keys-first
    pub modes: RenderModes,
    pub workers: WorkerConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_colour: rgba::WHITE,
            alpha_override: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            modes: RenderModes::default(),
            workers: WorkerConfig::default(),
        }
    }
}

impl RenderConfig {
    pub fn default_path() -> Option<PathBuf> {
        default_config_path()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(Error::from)
    }

    /// Load config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_toml_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Load config, returning defaults if the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save config to disk as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Push modes and colours into a worker's render state
    pub fn apply(&self, state: &mut RenderState) {
        state.set_modes(self.modes);
        state.ctx.base_colour = self.base_colour;
        state.ctx.alpha_override = self.alpha_override;
    }
}
