use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::KernelError;
use crate::clock::ClockConfig;
use crate::rigidbody::RigidbodyConfig;

/// Errors from loading or saving a simulation config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] KernelError),
}

/// Top-level simulation settings, stored as JSON.
///
/// Missing fields take their defaults, so a file only needs the values it changes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub clock: ClockConfig,
    pub body: RigidbodyConfig,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), KernelError> {
        self.clock.validate()?;
        self.body.validate()
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path.as_ref())?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "loaded sim config");
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
