//! YAML configuration loading.
//!
//! Parses and validates `duebell.yaml`.

use std::path::Path;

use crate::core::window::DUE_WINDOW_SECS;

use super::error::ConfigError;
use super::types::{DuebellConfig, NotifierConfig, StorageConfig};

/// Loader for duebell configuration.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<DuebellConfig, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DuebellConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlFileError {
                path: path.to_path_buf(),
                source,
            })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<DuebellConfig, ConfigError> {
        let config: DuebellConfig = serde_yaml::from_str(yaml)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate a configuration.
    pub fn validate(config: &DuebellConfig) -> Result<(), ConfigError> {
        let max_tick = DUE_WINDOW_SECS as u64;
        if config.tick_interval_secs == 0 || config.tick_interval_secs > max_tick {
            return Err(ConfigError::InvalidConfig(format!(
                "tick_interval_secs must be between 1 and {}, got {}",
                max_tick, config.tick_interval_secs
            )));
        }

        if config.app_name.trim().is_empty() {
            return Err(ConfigError::MissingField("app_name".into()));
        }

        if let StorageConfig::Sqlite { path, .. } = &config.storage
            && path.trim().is_empty()
        {
            return Err(ConfigError::MissingField("storage.path".into()));
        }

        if let NotifierConfig::Command {
            timeout_secs,
            program,
            ..
        } = &config.notifier
        {
            if *timeout_secs == 0 {
                return Err(ConfigError::InvalidConfig(
                    "notifier.timeout_secs cannot be zero".into(),
                ));
            }
            if program.as_deref().is_some_and(|p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidConfig(
                    "notifier.program cannot be empty".into(),
                ));
            }
        }

        if !config.seed.is_empty() && config.storage != StorageConfig::Memory {
            return Err(ConfigError::InvalidConfig(
                "seed records require the memory storage backend".into(),
            ));
        }

        Ok(())
    }
}
