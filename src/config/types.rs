//! Configuration type definitions.
//!
//! This module contains the structures deserialized from `duebell.yaml`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::slot::ClassSlot;
use crate::core::task::Task;

/// Default tick interval in seconds.
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 30;

/// Default application name shown in desktop notifications.
pub const DEFAULT_APP_NAME: &str = "Duebell";

/// Default notifier command timeout in seconds.
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration (duebell.yaml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuebellConfig {
    /// Seconds between scheduler ticks.
    pub tick_interval_secs: u64,
    /// Application name used for desktop notifications.
    pub app_name: String,
    /// Where tasks and class slots come from.
    pub storage: StorageConfig,
    /// How desktop notifications are delivered.
    pub notifier: NotifierConfig,
    /// Records loaded into the memory store at startup.
    pub seed: SeedConfig,
}

impl Default for DuebellConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            app_name: DEFAULT_APP_NAME.to_string(),
            storage: StorageConfig::default(),
            notifier: NotifierConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

impl DuebellConfig {
    /// Tick interval as a duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// In-memory store (default, non-persistent).
    #[serde(rename = "memory")]
    #[default]
    Memory,
    /// Existing SQLite planner database.
    #[serde(rename = "sqlite")]
    Sqlite {
        /// Path to the database file.
        path: String,
        /// Table naming used by the database.
        #[serde(default)]
        layout: SqliteLayoutConfig,
    },
}

/// Table naming of a SQLite planner database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqliteLayoutConfig {
    /// `tasks` / `class_slots`.
    #[default]
    Standard,
    /// `tugas` / `jadwal_kelas`.
    Indonesian,
}

/// Desktop notifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotifierConfig {
    /// Run a platform command.
    #[serde(rename = "command")]
    Command {
        /// Seconds allowed for the command to finish.
        #[serde(default = "default_notify_timeout_secs")]
        timeout_secs: u64,
        /// Program to run instead of the platform default.
        #[serde(default)]
        program: Option<String>,
        /// Arguments for `program`. `{app}`, `{title}` and `{message}` are
        /// substituted.
        #[serde(default)]
        args: Vec<String>,
    },
    /// Publish on the event bus only.
    #[serde(rename = "none")]
    None,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        NotifierConfig::Command {
            timeout_secs: DEFAULT_NOTIFY_TIMEOUT_SECS,
            program: None,
            args: Vec::new(),
        }
    }
}

fn default_notify_timeout_secs() -> u64 {
    DEFAULT_NOTIFY_TIMEOUT_SECS
}

/// Initial records for the memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub tasks: Vec<Task>,
    pub class_slots: Vec<ClassSlot>,
}

impl SeedConfig {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.class_slots.is_empty()
    }
}
