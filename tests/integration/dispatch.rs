//! Delivery integration tests.
//!
//! A scheduler tick drives reminders through the event bus and a real
//! command notifier.

use duebell::notify::{SLOT_REMINDER_TITLE, TASK_REMINDER_TITLE};
use duebell::testing::{FailingNotifier, FixedStore, RecordingHandler};
use duebell::{
    ClassSlot, EventBus, NotificationDispatcher, ReminderPolicy, ReminderScheduler, Task,
};
use std::sync::Arc;

use crate::common::{recording_dispatcher, wib};

fn planner() -> FixedStore {
    FixedStore::new(
        vec![
            Task::new(1, "Essay", "2025-01-13T15:00")
                .with_reminder(ReminderPolicy::MinutesBefore(30)),
        ],
        // 2025-01-13 is a Monday.
        vec![ClassSlot::new(1, "Senin", "Algorithms", "14:45").with_reminder_minutes(15)],
    )
}

#[tokio::test]
async fn test_task_and_slot_due_in_same_tick() {
    let (dispatcher, bus, notifier) = recording_dispatcher();
    let handler = RecordingHandler::new();
    bus.register(handler.clone()).await;

    let mut scheduler = ReminderScheduler::new(planner()).with_dispatcher(dispatcher);
    let report = scheduler.tick(wib(2025, 1, 13, 14, 30, 10)).await.unwrap();

    assert_eq!(report.notified_count(), 2);
    let sent = notifier.notifications();
    assert_eq!(sent[0].title, TASK_REMINDER_TITLE);
    assert_eq!(sent[0].message, "Essay is due at 2025-01-13T15:00");
    assert_eq!(sent[1].title, SLOT_REMINDER_TITLE);
    assert_eq!(sent[1].message, "Algorithms starts at 14:45");

    // The bus sees the same payloads.
    let payloads = handler.reminders().await;
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[1].message, sent[1].message);
}

#[tokio::test]
async fn test_failed_delivery_still_reaches_bus() {
    let bus = Arc::new(EventBus::new());
    let handler = RecordingHandler::new();
    bus.register(handler.clone()).await;

    let mut scheduler = ReminderScheduler::new(planner()).with_dispatcher(
        NotificationDispatcher::new(Arc::clone(&bus), Arc::new(FailingNotifier)),
    );

    let report = scheduler.tick(wib(2025, 1, 13, 14, 30, 10)).await.unwrap();
    assert_eq!(report.delivery_failures, 2);
    assert_eq!(handler.reminders().await.len(), 2);

    // Still debounced.
    let report = scheduler.tick(wib(2025, 1, 13, 14, 30, 20)).await.unwrap();
    assert_eq!(report.notified_count(), 0);
    assert_eq!(report.suppressed, 2);
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_notifier_receives_text() {
    use duebell::{CommandNotifier, NotifierBackend};
    use tempfile::TempDir;

    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("notification.txt");
    let script = format!(
        "printf '%s|%s|%s\\n' \"$DUEBELL_APP\" \"$DUEBELL_TITLE\" \"$DUEBELL_MESSAGE\" >> '{}'",
        out.display()
    );
    let notifier = CommandNotifier::new(
        NotifierBackend::Custom {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script],
        },
        "Planner",
    );

    let bus = Arc::new(EventBus::new());
    let mut scheduler = ReminderScheduler::new(planner())
        .with_dispatcher(NotificationDispatcher::new(bus, Arc::new(notifier)));

    let report = scheduler.tick(wib(2025, 1, 13, 14, 30, 10)).await.unwrap();
    assert_eq!(report.delivery_failures, 0);

    let written = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines,
        vec![
            format!("Planner|{}|Essay is due at 2025-01-13T15:00", TASK_REMINDER_TITLE),
            format!("Planner|{}|Algorithms starts at 14:45", SLOT_REMINDER_TITLE),
        ]
    );
}
