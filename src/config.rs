//! Configuration management for AudioMatrix GW
//!
//! Handles loading and parsing of the YAML configuration file and validation
//! of the device endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

/// Configuration load failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Matrix device endpoint
///
/// Both fields default to "unset" so a partially filled config can still be
/// loaded; the connection manager refuses to dial until
/// [`DeviceConfig::is_complete`] holds.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeviceConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
}

impl DeviceConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host and port must both be present before a connection attempt
    pub fn is_complete(&self) -> bool {
        !self.host.trim().is_empty() && self.port != 0
    }
}

impl AppConfig {
    /// Load and parse a YAML configuration file
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_complete() {
        assert!(DeviceConfig::new("10.0.0.5", 9760).is_complete());
        assert!(!DeviceConfig::new("", 9760).is_complete());
        assert!(!DeviceConfig::new("   ", 9760).is_complete());
        assert!(!DeviceConfig::new("10.0.0.5", 0).is_complete());
        assert!(!DeviceConfig::default().is_complete());
    }

    #[tokio::test]
    async fn test_load_yaml_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "device:\n  host: 192.168.1.20\n  port: 9760").unwrap();

        let config = AppConfig::load(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(config.device, DeviceConfig::new("192.168.1.20", 9760));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_read_error() {
        let err = AppConfig::load("/nonexistent/config.yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn test_load_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "device: [not, a, mapping").unwrap();

        let err = AppConfig::load(file.path().to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
