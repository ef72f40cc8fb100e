//! Evaluator configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::engine::SessionOptions;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for the engine and the evaluators built on it.
///
/// Every key is optional in the file:
///
/// ```toml
/// engine_path = "/usr/games/stockfish"
/// depth = 18
/// threads = 4
/// hash_mb = 256
/// liveness_timeout_secs = 120
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Engine executable. Discovered from conventional locations when unset.
    pub engine_path: Option<PathBuf>,
    /// Search depth used when a request names no limit.
    pub depth: u32,
    /// Engine `Threads` option.
    pub threads: Option<u32>,
    /// Engine `Hash` option in megabytes.
    pub hash_mb: Option<u32>,
    /// Seconds of engine silence tolerated during a search. 0 disables the check.
    pub liveness_timeout_secs: u64,
    pub handshake_timeout_secs: u64,
    pub quit_grace_ms: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            engine_path: None,
            depth: 20,
            threads: None,
            hash_mb: None,
            liveness_timeout_secs: 120,
            handshake_timeout_secs: 10,
            quit_grace_ms: 1000,
        }
    }
}

impl EvaluatorConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read,
    /// or [`ConfigError::Parse`] if it contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The engine session settings described by this configuration.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            engine_path: self.engine_path.clone(),
            threads: self.threads,
            hash_mb: self.hash_mb,
            liveness_timeout: (self.liveness_timeout_secs > 0)
                .then(|| Duration::from_secs(self.liveness_timeout_secs)),
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs.max(1)),
            quit_grace: Duration::from_millis(self.quit_grace_ms),
        }
    }
}
