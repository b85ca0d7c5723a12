//! TOML-based application configuration.
//!
//! Holds the two tunable sections of the engine:
//! - projection: preliminary-call lead time
//! - bell: tick interval and tolerance window
//!
//! Configuration is stored at `~/.config/belltime/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::bell::BellLoopConfig;
use crate::error::ConfigError;
use crate::projector::ProjectionConfig;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/belltime/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub bell: BellLoopConfig,
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from an explicit path, with no write-back on absence.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|err| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        toml::from_str(&content).map_err(|err| ConfigError::ParseFailed(err.to_string()))
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.projection.preliminary_lead_min, 2);
        assert_eq!(cfg.bell.tick_interval_secs, 60);
        assert_eq!(cfg.bell.tolerance_secs, 30);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str("[bell]\ntolerance_secs = 45\n").unwrap();
        assert_eq!(cfg.bell.tolerance_secs, 45);
        assert_eq!(cfg.bell.tick_interval_secs, 60);
        assert_eq!(cfg.projection.preliminary_lead_min, 2);
    }

    #[test]
    fn load_from_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.projection.preliminary_lead_min = 5;
        std::fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load_from(&dir.path().join("absent.toml")),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
