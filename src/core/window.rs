//! Due-window matchers.
//!
//! Both matchers are pure functions of an entity and an instant. They never
//! touch the store, the clock or the debounce state, so the scheduler can
//! evaluate them at any `now` and tests can pin `now` to a fixed offset.

use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Timelike};

use super::deadline::{DeadlineParseError, parse_deadline};
use super::slot::{ClassSlot, parse_start_time, parse_weekday};
use super::task::{ReminderPolicy, Task};

/// Width of every due window, in seconds.
pub const DUE_WINDOW_SECS: i64 = 30;

/// Last second past the hour at which an hourly reminder still fires.
pub const HOURLY_TRIGGER_LAST_SECOND: u32 = 30;

/// Width of every due window.
pub fn due_window() -> TimeDelta {
    TimeDelta::seconds(DUE_WINDOW_SECS)
}

/// Result of evaluating a task at an instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskWindow<Tz: TimeZone> {
    /// Whether a reminder is due right now.
    pub due: bool,
    /// Once `now` reaches this instant, any debounce entry for the task
    /// belongs to a closed window.
    pub reference: DateTime<Tz>,
}

/// Result of evaluating a class slot at an instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotWindow<Tz: TimeZone> {
    pub due: bool,
    /// End of today's notification window. Absent when the slot does not
    /// recur today or its start time is malformed.
    pub window_end: Option<DateTime<Tz>>,
}

/// Evaluate a task's deadline window at `now`.
///
/// Returns an error only when the deadline text matches no accepted layout.
pub fn evaluate_deadline<Tz: TimeZone>(
    task: &Task,
    now: &DateTime<Tz>,
) -> Result<TaskWindow<Tz>, DeadlineParseError> {
    let deadline = parse_deadline(&task.deadline, &now.timezone())?;

    // The reference does not depend on completion, so toggling a task inside
    // an open window keeps its debounce entry.
    let reference = match task.reminder {
        ReminderPolicy::HourlyOnDueDay if deadline >= *now => hourly_window_close(now),
        _ => deadline.clone(),
    };
    if task.completed || !task.reminder.is_enabled() || deadline < *now {
        return Ok(TaskWindow {
            due: false,
            reference,
        });
    }

    let remaining = deadline.signed_duration_since(now);

    let due = match task.reminder {
        ReminderPolicy::None => false,
        ReminderPolicy::HourlyOnDueDay => {
            remaining < TimeDelta::hours(24)
                && now.minute() == 0
                && now.second() <= HOURLY_TRIGGER_LAST_SECOND
        }
        ReminderPolicy::MinutesBefore(minutes) => {
            let lead = TimeDelta::minutes(i64::from(minutes));
            remaining <= lead && remaining > lead - due_window()
        }
    };
    Ok(TaskWindow { due, reference })
}

/// Check whether a task reminder is due at `now`.
///
/// Unparseable deadlines are never due.
pub fn deadline_due<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> bool {
    evaluate_deadline(task, now).is_ok_and(|window| window.due)
}

/// First instant after the hourly trigger window of the hour containing `now`.
fn hourly_window_close<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let into_hour = TimeDelta::seconds(i64::from(now.minute()) * 60 + i64::from(now.second()))
        + TimeDelta::nanoseconds(i64::from(now.nanosecond()));
    now.clone() - into_hour + TimeDelta::seconds(i64::from(HOURLY_TRIGGER_LAST_SECOND) + 1)
}

/// Evaluate a class slot's window at `now`.
pub fn evaluate_slot<Tz: TimeZone>(slot: &ClassSlot, now: &DateTime<Tz>) -> SlotWindow<Tz> {
    let not_today = SlotWindow {
        due: false,
        window_end: None,
    };

    match parse_weekday(&slot.weekday) {
        Some(day) if day == now.weekday() => {}
        _ => return not_today,
    }
    let Some(start) = parse_start_time(&slot.start_time) else {
        return not_today;
    };

    let local_start = now.date_naive().and_time(start);
    let Some(target) = now.timezone().from_local_datetime(&local_start).earliest() else {
        return not_today;
    };

    let notify_at = target - TimeDelta::minutes(i64::from(slot.reminder_minutes));
    let window_end = notify_at.clone() + due_window();
    let due = notify_at < *now && *now < window_end;

    SlotWindow {
        due,
        window_end: Some(window_end),
    }
}

/// Check whether a class slot reminder is due at `now`, returning the end of
/// today's window alongside.
pub fn schedule_due<Tz: TimeZone>(
    slot: &ClassSlot,
    now: &DateTime<Tz>,
) -> (bool, Option<DateTime<Tz>>) {
    let window = evaluate_slot(slot, now);
    (window.due, window.window_end)
}
