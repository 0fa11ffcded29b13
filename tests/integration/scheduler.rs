//! Running-loop integration tests.
//!
//! These drive the real scheduler loop against the wall clock with a short
//! tick interval.

use chrono::TimeDelta;
use duebell::events::{TOPIC_SCHEDULER_STARTED, TOPIC_SCHEDULER_STOPPED};
use duebell::testing::{FailingStore, FlakyStore, RecordingHandler};
use duebell::{InMemoryStore, ReminderPolicy, ReminderScheduler, SchedulerState, Task, TaskId};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::common::{local_deadline_in, recording_dispatcher, wait_until};

const TICK: Duration = Duration::from_millis(50);

fn store_with_due_task() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .insert_task(
            Task::new(1, "Essay", local_deadline_in(TimeDelta::minutes(10)))
                .with_reminder(ReminderPolicy::MinutesBefore(10)),
        )
        .unwrap();
    store
}

#[tokio::test]
async fn test_running_loop_notifies_once_per_window() {
    let (dispatcher, bus, notifier) = recording_dispatcher();
    let handler = RecordingHandler::new();
    bus.register(handler.clone()).await;

    let scheduler = ReminderScheduler::new(store_with_due_task())
        .with_dispatcher(dispatcher)
        .with_tick_interval(TICK)
        .unwrap();

    let (handle, task) = scheduler.start(CancellationToken::new()).await;
    assert!(handle.is_running().await);

    let counter = Arc::clone(&notifier);
    wait_until(move || counter.count() >= 1, Duration::from_secs(5), "first reminder").await;

    // Several more ticks inside the same window.
    tokio::time::sleep(TICK * 6).await;
    assert_eq!(notifier.count(), 1);

    let reminders = handler.reminders().await;
    assert_eq!(reminders.len(), 1);
    assert!(reminders[0].message.starts_with("Essay is due at "));

    handle.shutdown();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("scheduler should stop")
        .unwrap();
    assert_eq!(handle.state().await, SchedulerState::Stopped);
}

#[tokio::test]
async fn test_external_cancellation_stops_loop() {
    let (dispatcher, bus, _notifier) = recording_dispatcher();
    let handler = RecordingHandler::new();
    bus.register(handler.clone()).await;

    let scheduler = ReminderScheduler::new(InMemoryStore::new())
        .with_dispatcher(dispatcher)
        .with_tick_interval(TICK)
        .unwrap();

    let cancel = CancellationToken::new();
    let (handle, task) = scheduler.start(cancel.clone()).await;

    tokio::time::sleep(TICK * 3).await;
    cancel.cancel();
    assert!(handle.is_shutdown_requested());

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("scheduler should stop")
        .unwrap();

    assert!(!handle.is_running().await);
    let topics = handler.topics().await;
    assert_eq!(topics.first(), Some(&TOPIC_SCHEDULER_STARTED));
    assert_eq!(topics.last(), Some(&TOPIC_SCHEDULER_STOPPED));
}

#[tokio::test]
async fn test_cancel_before_first_tick() {
    let store = Arc::new(FailingStore::new("unreachable"));
    let scheduler = ReminderScheduler::with_store(Arc::clone(&store))
        .with_tick_interval(Duration::from_secs(30))
        .unwrap();

    let (handle, task) = scheduler.start(CancellationToken::new()).await;
    handle.shutdown();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("scheduler should stop")
        .unwrap();

    // The first tick is one full interval after start.
    assert_eq!(store.attempts(), 0);
}

#[tokio::test]
async fn test_loop_survives_store_failures() {
    let (dispatcher, _bus, notifier) = recording_dispatcher();
    let store = Arc::new(FlakyStore::new(store_with_due_task(), 3));

    let scheduler = ReminderScheduler::with_store(Arc::clone(&store))
        .with_dispatcher(dispatcher)
        .with_tick_interval(TICK)
        .unwrap();
    let (handle, task) = scheduler.start(CancellationToken::new()).await;

    let counter = Arc::clone(&notifier);
    wait_until(move || counter.count() >= 1, Duration::from_secs(5), "reminder after failures").await;
    assert!(handle.is_running().await);

    handle.shutdown();
    task.await.unwrap();
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_reopened_task_stays_quiet_within_window() {
    let (dispatcher, _bus, notifier) = recording_dispatcher();
    let store = Arc::new(store_with_due_task());

    let scheduler = ReminderScheduler::with_store(Arc::clone(&store))
        .with_dispatcher(dispatcher)
        .with_tick_interval(TICK)
        .unwrap();
    let (handle, task) = scheduler.start(CancellationToken::new()).await;

    let counter = Arc::clone(&notifier);
    wait_until(move || counter.count() >= 1, Duration::from_secs(5), "first reminder").await;

    store.set_task_completed(TaskId::new(1), true).unwrap();
    tokio::time::sleep(TICK * 4).await;
    store.set_task_completed(TaskId::new(1), false).unwrap();
    tokio::time::sleep(TICK * 6).await;

    handle.shutdown();
    task.await.unwrap();
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_task_outside_window_is_quiet() {
    let (dispatcher, _bus, notifier) = recording_dispatcher();
    let store = InMemoryStore::new();
    store
        .insert_task(
            Task::new(1, "Later", local_deadline_in(TimeDelta::hours(3)))
                .with_reminder(ReminderPolicy::MinutesBefore(10)),
        )
        .unwrap();
    store
        .insert_task(Task::new(2, "Silent", local_deadline_in(TimeDelta::minutes(5))))
        .unwrap();

    let scheduler = ReminderScheduler::new(store)
        .with_dispatcher(dispatcher)
        .with_tick_interval(TICK)
        .unwrap();
    let (handle, task) = scheduler.start(CancellationToken::new()).await;

    tokio::time::sleep(TICK * 6).await;
    handle.shutdown();
    task.await.unwrap();

    assert_eq!(notifier.count(), 0);
}
