//! Configuration loading and parsing.
//!
//! This module provides YAML-based configuration for the reminder engine.

mod error;
mod types;
mod yaml;

pub use error::ConfigError;
pub use types::{
    DEFAULT_APP_NAME, DEFAULT_NOTIFY_TIMEOUT_SECS, DEFAULT_TICK_INTERVAL_SECS, DuebellConfig,
    NotifierConfig, SeedConfig, SqliteLayoutConfig, StorageConfig,
};
pub use yaml::ConfigLoader;
