//! duebell - deadline and class-slot reminders.
//!
//! A periodic scheduler reads tasks and weekly class slots from a [`Store`],
//! decides which ones fall inside a reminder window, and delivers one
//! notification per window through the [`EventBus`] and the desktop.

pub mod config;
pub mod core;
pub mod events;
pub mod notify;
pub mod scheduler;
pub mod storage;
pub mod testing;

pub use config::{ConfigError, ConfigLoader, DuebellConfig};
pub use core::deadline::{DeadlineParseError, parse_deadline};
pub use core::slot::{ClassSlot, parse_start_time, parse_weekday};
pub use core::task::{PolicyParseError, ReminderPolicy, Task};
pub use core::types::{SlotId, TaskId};
pub use core::window::{deadline_due, evaluate_deadline, evaluate_slot, schedule_due};
pub use events::{Event, EventBus, EventHandler, ReminderPayload};
pub use notify::{
    CommandNotifier, NoopNotifier, Notification, NotificationDispatcher, NotifierBackend,
    NotifyError, OsNotifier,
};
pub use scheduler::{
    DebounceTracker, DueReminder, Entity, EntityKind, ReminderScheduler, SchedulerError,
    SchedulerHandle, SchedulerState, TickReport, due_reminders,
};
#[cfg(feature = "sqlite")]
pub use storage::{SqliteLayout, SqliteStore};
pub use storage::{InMemoryStore, Store, StoreError};
