//! Configuration loading traits and types.
//!
//! Provides a standardized way to load the engine's TOML configuration,
//! mirroring the loader pattern used across the rest of the workspace.
//!
//! # Usage
//!
//! ```rust,no_run
//! use simtelem_common::config::{EngineConfig, ConfigLoader};
//! use std::path::Path;
//!
//! let config = EngineConfig::load(Path::new("config.toml")).expect("load config");
//! println!("service: {}", config.shared.service_name);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts;

/// Log level for configuration (mirrors `tracing::Level` without requiring
/// callers to depend on `tracing` just to deserialize a config file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// The `tracing_subscriber::EnvFilter` directive for this level.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// Unknown field in TOML (strict parsing with `deny_unknown_fields`).
    #[error("Unknown field: {0}")]
    UnknownField(String),
}

/// Common configuration fields shared by every binary in the workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    pub service_name: String,
}

impl SharedConfig {
    /// # Errors
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist.
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("unknown field") {
                ConfigError::UnknownField(msg)
            } else {
                ConfigError::ParseError(msg)
            }
        })
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

fn default_num_threads() -> usize {
    consts::MIN_THREADS
}
fn default_queue_size() -> usize {
    consts::DEFAULT_QUEUE_SIZE
}
fn default_transport_timeout_ms() -> u64 {
    consts::TRANSPORT_TIMEOUT_MS
}
fn default_n_files() -> usize {
    consts::N_FILES
}
fn default_initial_map_size() -> usize {
    consts::DEFAULT_MAP_SIZE
}

/// Engine-wide configuration — loaded from `config.toml`.
///
/// Every field beyond `[shared]` has a sensible default drawn from
/// [`consts`](crate::consts), so a bare `[shared]` table is a valid file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub shared: SharedConfig,

    /// Worker thread count used by the Extract/Transform/Enrich stages.
    /// Must be at least [`consts::MIN_THREADS`].
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,

    /// Bounded capacity of the enrichment `SlowService` queue.
    #[serde(default = "default_queue_size")]
    pub enrichment_queue_size: usize,

    /// Blocking timeout, in milliseconds, the ingest orchestrator waits on
    /// a single transport poll before re-checking for shutdown.
    #[serde(default = "default_transport_timeout_ms")]
    pub transport_timeout_ms: u64,

    /// Number of rotating `<n>.csv`/`<n>.tmp` file slots the file-drop
    /// transport cycles through.
    #[serde(default = "default_n_files")]
    pub file_transport_slots: usize,

    /// Initial bucket count reserved in the vehicle index before growth.
    #[serde(default = "default_initial_map_size")]
    pub initial_map_size: usize,
}

impl EngineConfig {
    /// # Errors
    /// Returns `ConfigError::ValidationError` if `num_threads` is below
    /// [`consts::MIN_THREADS`], or if `enrichment_queue_size` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.num_threads < consts::MIN_THREADS {
            return Err(ConfigError::ValidationError(format!(
                "num_threads={} is below the minimum of {}",
                self.num_threads,
                consts::MIN_THREADS
            )));
        }
        if self.enrichment_queue_size == 0 {
            return Err(ConfigError::ValidationError(
                "enrichment_queue_size must be non-zero".to_string(),
            ));
        }
        if self.file_transport_slots == 0 {
            return Err(ConfigError::ValidationError(
                "file_transport_slots must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
