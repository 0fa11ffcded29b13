//! Reminder scheduler.
//!
//! This module provides the periodic loop that evaluates tasks and class
//! slots, the debounce tracker that keeps each window to one reminder, and
//! a dry-run evaluator for inspecting what is due.

mod debounce;
mod engine;
mod handle;
mod preview;
mod types;

pub use debounce::{DebounceTracker, Entity, EntityKind};
pub use engine::ReminderScheduler;
pub use handle::SchedulerHandle;
pub use preview::{DueReminder, due_reminders};
pub use types::{
    DEFAULT_TICK_INTERVAL, MAX_TICK_INTERVAL, SchedulerError, SchedulerState, TickReport,
};
