//! Planner store abstraction.
//!
//! The reminder engine reads tasks and class slots through the [`Store`]
//! trait once per tick. Backends own their own concurrency safety; the
//! engine shares them with whatever else edits the planner.

mod memory;
#[cfg(any(feature = "sqlite", test))]
mod sqlite;

pub use memory::InMemoryStore;
#[cfg(any(feature = "sqlite", test))]
pub use sqlite::{SqliteLayout, SqliteStore};

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::core::slot::ClassSlot;
use crate::core::task::{ReminderPolicy, Task};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested item was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A duplicate key was detected.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A record failed validation.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Store lock was poisoned.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// Generic store error.
    #[error("store error: {0}")]
    Other(String),
}

/// Read access to the planner's tasks and class slots.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch every task, ordered by deadline text.
    async fn fetch_tasks(&self) -> Result<Vec<Task>, StoreError>;

    /// Fetch every class slot grouped under its weekday label, each group
    /// ordered by start time.
    async fn fetch_schedules_by_day(&self) -> Result<BTreeMap<String, Vec<ClassSlot>>, StoreError>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, StoreError> {
        (**self).fetch_tasks().await
    }

    async fn fetch_schedules_by_day(&self) -> Result<BTreeMap<String, Vec<ClassSlot>>, StoreError> {
        (**self).fetch_schedules_by_day().await
    }
}

/// Group slots by their weekday label, keeping input order within a day.
pub(crate) fn group_by_day(slots: impl IntoIterator<Item = ClassSlot>) -> BTreeMap<String, Vec<ClassSlot>> {
    let mut days: BTreeMap<String, Vec<ClassSlot>> = BTreeMap::new();
    for slot in slots {
        days.entry(slot.weekday.clone()).or_default().push(slot);
    }
    days
}

/// Read a stored policy string, falling back to no reminder when it is
/// malformed.
pub(crate) fn policy_or_none(raw: &str, context: &str) -> ReminderPolicy {
    raw.parse().unwrap_or_else(|e| {
        tracing::warn!(record = context, error = %e, "Ignoring malformed reminder policy");
        ReminderPolicy::None
    })
}
