//! Harness configuration file handling

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Suite-level settings
    #[serde(default)]
    pub suite: SuiteSettings,

    /// Managed process settings
    #[serde(default)]
    pub processes: ProcessSettings,
}

/// Suite-level settings
#[derive(Debug, Deserialize, Clone)]
pub struct SuiteSettings {
    /// Seconds to wait after starting managed apps before sending queries
    #[serde(default = "default_startup_grace")]
    pub startup_grace_secs: u64,
}

impl Default for SuiteSettings {
    fn default() -> Self {
        Self {
            startup_grace_secs: default_startup_grace(),
        }
    }
}

fn default_startup_grace() -> u64 {
    5
}

/// Managed process settings
#[derive(Debug, Deserialize, Clone)]
pub struct ProcessSettings {
    /// Seconds an app gets to exit after SIGTERM before it is killed
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_secs: u64,

    /// Re-emit app stdout/stderr lines as debug log events
    #[serde(default = "default_forward_output")]
    pub forward_output: bool,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            stop_timeout_secs: default_stop_timeout(),
            forward_output: default_forward_output(),
        }
    }
}

fn default_stop_timeout() -> u64 {
    5
}
fn default_forward_output() -> bool {
    true
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Grace period between starting apps and running the first query
    pub fn startup_grace(&self) -> Duration {
        Duration::from_secs(self.suite.startup_grace_secs)
    }

    /// Time allowed for a managed app to exit gracefully
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.processes.stop_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.startup_grace(), Duration::from_secs(5));
        assert_eq!(config.stop_timeout(), Duration::from_secs(5));
        assert!(config.processes.forward_output);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[suite]\nstartup_grace_secs = 0\n").unwrap();
        assert_eq!(config.startup_grace(), Duration::ZERO);
        assert_eq!(config.processes.stop_timeout_secs, 5);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/metrics-e2e.toml")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[suite\nbroken").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }
}
