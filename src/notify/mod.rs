//! Reminder delivery.
//!
//! A [`Notification`] is a title/message pair. The [`NotificationDispatcher`]
//! publishes it on the event bus for the UI and hands it to an [`OsNotifier`]
//! for a desktop toast.

mod command;
mod dispatcher;

pub use command::{CommandNotifier, NoopNotifier, NotifierBackend};
pub use dispatcher::NotificationDispatcher;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::core::slot::{ClassSlot, parse_start_time};
use crate::core::task::Task;

/// Title used for task deadline reminders.
pub const TASK_REMINDER_TITLE: &str = "⏰ Task deadline!";

/// Title used for class slot reminders.
pub const SLOT_REMINDER_TITLE: &str = "🔔 Class reminder!";

/// Errors raised while delivering an OS notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The notifier program could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The notifier program exited unsuccessfully.
    #[error("'{program}' exited with code {code}: {stderr}")]
    Failed {
        program: String,
        code: i32,
        stderr: String,
    },

    /// The notifier program did not finish in time.
    #[error("notification timed out after {0:?}")]
    Timeout(Duration),

    /// No notifier is available on this platform.
    #[error("no desktop notifier available for {0}")]
    Unsupported(String),
}

/// A reminder ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Reminder for an approaching task deadline.
    pub fn for_task(task: &Task) -> Self {
        Self::new(
            TASK_REMINDER_TITLE,
            format!("{} is due at {}", task.title, task.deadline.trim()),
        )
    }

    /// Reminder for an upcoming class slot.
    pub fn for_slot(slot: &ClassSlot) -> Self {
        let start = parse_start_time(&slot.start_time)
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| slot.start_time.trim().to_string());
        Self::new(SLOT_REMINDER_TITLE, format!("{} starts at {}", slot.subject, start))
    }
}

/// Desktop notification backend.
#[async_trait]
pub trait OsNotifier: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Deliver a notification.
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::ReminderPolicy;

    #[test]
    fn test_task_message() {
        let task = Task::new(1, "Essay", "2025-01-10T15:00")
            .with_reminder(ReminderPolicy::MinutesBefore(30));
        let n = Notification::for_task(&task);
        assert_eq!(n.title, "⏰ Task deadline!");
        assert_eq!(n.message, "Essay is due at 2025-01-10T15:00");
    }

    #[test]
    fn test_slot_message_normalizes_seconds() {
        let slot = ClassSlot::new(2, "Senin", "Algorithms", "09:00:00");
        let n = Notification::for_slot(&slot);
        assert_eq!(n.title, "🔔 Class reminder!");
        assert_eq!(n.message, "Algorithms starts at 09:00");
    }

    #[test]
    fn test_error_messages() {
        let err = NotifyError::Failed {
            program: "notify-send".to_string(),
            code: 1,
            stderr: "no bus".to_string(),
        };
        assert_eq!(err.to_string(), "'notify-send' exited with code 1: no bus");
        assert_eq!(
            NotifyError::Timeout(Duration::from_secs(5)).to_string(),
            "notification timed out after 5s"
        );
    }
}
