//! Core identifier types for the reminder engine.
//!
//! Tasks and class slots are keyed by the integer row identifiers the
//! planner store hands out. Wrapping them keeps a task id from being used
//! where a slot id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

/// Unique identifier for a weekly class slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(i64);

impl TaskId {
    /// Create a new TaskId from a raw store identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying integer value.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl SlotId {
    /// Create a new SlotId from a raw store identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying integer value.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for SlotId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
