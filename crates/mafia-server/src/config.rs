//! RON configuration for the match service

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Server configuration
///
/// Loaded from a RON file; every field has a default so an empty `()`
/// document is a valid configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Listen address (host:port)
    #[serde(default = "default_listen")]
    pub listen: String,
    /// How long the wait endpoints hold a request open before reporting
    /// cancellation, in seconds
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    /// Fixed seed for role shuffles; wall-clock entropy when absent
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_wait_timeout_secs() -> u64 {
    600
}

impl Config {
    /// Load a configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(ron::from_str(&raw)?)
    }

    /// The wait deadline as a [`Duration`]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            wait_timeout_secs: default_wait_timeout_secs(),
            shuffle_seed: None,
        }
    }
}

/// Errors raised while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listen, "0.0.0.0:3000");
        assert_eq!(config.wait_timeout(), Duration::from_secs(600));
        assert_eq!(config.shuffle_seed, None);
    }

    #[test]
    fn test_parse_overrides() {
        let config: Config = ron::from_str(
            r#"(
                listen: "127.0.0.1:8080",
                wait_timeout_secs: 30,
                shuffle_seed: Some(42),
            )"#,
        )
        .unwrap();
        assert_eq!(config.listen, "127.0.0.1:8080");
        assert_eq!(config.wait_timeout_secs, 30);
        assert_eq!(config.shuffle_seed, Some(42));
    }

    #[test]
    fn test_parse_empty_document_uses_defaults() {
        let config: Config = ron::from_str("()").unwrap();
        assert_eq!(config.listen, "0.0.0.0:3000");
    }
}
