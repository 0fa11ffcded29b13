//! Task records and reminder policies.
//!
//! A task is a one-shot deadline owned by the planner store. The engine only
//! reads tasks; it never changes them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::types::TaskId;

/// Textual form of [`ReminderPolicy::None`].
pub const POLICY_NONE: &str = "NONE";

/// Textual form of [`ReminderPolicy::HourlyOnDueDay`].
pub const POLICY_HOURLY_ON_DUE_DAY: &str = "HOURLY_ON_DUE_DAY";

/// Error returned when a reminder policy string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid reminder policy '{0}': expected NONE, HOURLY_ON_DUE_DAY or a non-negative number of minutes")]
pub struct PolicyParseError(pub String);

/// When a task's reminder window opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReminderPolicy {
    /// Never remind.
    #[default]
    None,
    /// Remind once, this many minutes before the deadline.
    MinutesBefore(u32),
    /// Remind at the top of every hour during the final 24 hours.
    HourlyOnDueDay,
}

impl ReminderPolicy {
    /// Check if this policy can ever produce a reminder.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ReminderPolicy::None)
    }
}

impl FromStr for ReminderPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(POLICY_NONE) {
            return Ok(ReminderPolicy::None);
        }
        if trimmed.eq_ignore_ascii_case(POLICY_HOURLY_ON_DUE_DAY) {
            return Ok(ReminderPolicy::HourlyOnDueDay);
        }
        trimmed
            .parse::<u32>()
            .map(ReminderPolicy::MinutesBefore)
            .map_err(|_| PolicyParseError(s.to_string()))
    }
}

impl TryFrom<String> for ReminderPolicy {
    type Error = PolicyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReminderPolicy> for String {
    fn from(policy: ReminderPolicy) -> Self {
        policy.to_string()
    }
}

impl fmt::Display for ReminderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderPolicy::None => write!(f, "{}", POLICY_NONE),
            ReminderPolicy::MinutesBefore(minutes) => write!(f, "{}", minutes),
            ReminderPolicy::HourlyOnDueDay => write!(f, "{}", POLICY_HOURLY_ON_DUE_DAY),
        }
    }
}

/// A task with a deadline, as stored by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable store identifier.
    pub id: TaskId,
    /// Short title shown in reminders.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Deadline text in one of the accepted layouts.
    pub deadline: String,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Reminder policy.
    #[serde(default)]
    pub reminder: ReminderPolicy,
}

impl Task {
    /// Create a new, incomplete task with no reminder.
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, deadline: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            deadline: deadline.into(),
            completed: false,
            reminder: ReminderPolicy::None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the reminder policy.
    pub fn with_reminder(mut self, reminder: ReminderPolicy) -> Self {
        self.reminder = reminder;
        self
    }

    /// Set the completed flag.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}
