//! Dry-run evaluation of what is due at an instant.

use chrono::{DateTime, TimeZone};

use crate::core::window::{evaluate_deadline, evaluate_slot};
use crate::notify::Notification;
use crate::storage::{Store, StoreError};

use super::debounce::Entity;

/// A reminder that would fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder {
    pub entity: Entity,
    pub notification: Notification,
}

/// List every reminder due at `now` without dispatching or debouncing.
pub async fn due_reminders<S, Tz>(store: &S, now: &DateTime<Tz>) -> Result<Vec<DueReminder>, StoreError>
where
    S: Store + ?Sized,
    Tz: TimeZone,
{
    let tasks = store.fetch_tasks().await?;
    let days = store.fetch_schedules_by_day().await?;

    let mut due = Vec::new();
    for task in &tasks {
        if evaluate_deadline(task, now).is_ok_and(|window| window.due) {
            due.push(DueReminder {
                entity: Entity::Task(task.id),
                notification: Notification::for_task(task),
            });
        }
    }
    for slot in days.values().flatten() {
        if evaluate_slot(slot, now).due {
            due.push(DueReminder {
                entity: Entity::Slot(slot.id),
                notification: Notification::for_slot(slot),
            });
        }
    }
    Ok(due)
}
