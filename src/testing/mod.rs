//! Testing utilities for users of the duebell library.
//!
//! This module provides test doubles for the engine's collaborators:
//!
//! - [`RecordingNotifier`]: captures every desktop notification
//! - [`FailingNotifier`]: rejects every desktop notification
//! - [`RecordingHandler`]: captures every event published on the bus
//! - [`FailingStore`]: a store whose fetches always fail
//! - [`FlakyStore`]: a store that fails a fixed number of fetches first
//! - [`FixedStore`]: a store serving fixed records with no validation

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::slot::ClassSlot;
use crate::core::task::Task;
use crate::events::{Event, EventHandler, ReminderPayload};
use crate::notify::{Notification, NotifyError, OsNotifier};
use crate::storage::{Store, StoreError, group_by_day};

/// Notifier that records every notification it receives.
///
/// # Example
///
/// ```
/// use duebell::testing::RecordingNotifier;
/// use duebell::notify::{Notification, OsNotifier};
///
/// # tokio_test_block(async {
/// let notifier = RecordingNotifier::new();
/// notifier.notify(&Notification::new("title", "body")).await.unwrap();
/// assert_eq!(notifier.count(), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f);
/// # }
/// ```
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of notifications received so far.
    pub fn count(&self) -> usize {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl OsNotifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification.clone());
        Ok(())
    }
}

/// Notifier that always fails with a timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNotifier;

#[async_trait]
impl OsNotifier for FailingNotifier {
    fn name(&self) -> &str {
        "failing"
    }

    async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Timeout(Duration::ZERO))
    }
}

/// Event handler that records every event.
pub struct RecordingHandler {
    events: tokio::sync::Mutex<Vec<Event>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: tokio::sync::Mutex::new(Vec::new()),
        })
    }

    /// All events received so far.
    pub async fn events(&self) -> Vec<Event> {
        self.events.lock().await.clone()
    }

    /// Topics of all events received so far, in order.
    pub async fn topics(&self) -> Vec<&'static str> {
        self.events.lock().await.iter().map(Event::topic).collect()
    }

    /// Payloads of the reminder events received so far.
    pub async fn reminders(&self) -> Vec<ReminderPayload> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|event| match event {
                Event::Reminder { payload, .. } => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: &Event) {
        self.events.lock().await.push(event.clone());
    }
}

/// Store whose fetches always fail.
pub struct FailingStore {
    message: String,
    attempts: AtomicUsize,
}

impl FailingStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Number of fetches attempted.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Other(self.message.clone()))
    }

    async fn fetch_schedules_by_day(&self) -> Result<BTreeMap<String, Vec<ClassSlot>>, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Other(self.message.clone()))
    }
}

/// Store that fails its first `failures` task fetches, then delegates.
pub struct FlakyStore<S: Store> {
    inner: S,
    failures_left: AtomicUsize,
}

impl<S: Store> FlakyStore<S> {
    pub fn new(inner: S, failures: usize) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(failures),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: Store> Store for FlakyStore<S> {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StoreError::Other("injected failure".to_string()));
        }
        self.inner.fetch_tasks().await
    }

    async fn fetch_schedules_by_day(&self) -> Result<BTreeMap<String, Vec<ClassSlot>>, StoreError> {
        self.inner.fetch_schedules_by_day().await
    }
}

/// Store serving fixed records exactly as given.
#[derive(Debug, Clone, Default)]
pub struct FixedStore {
    tasks: Vec<Task>,
    slots: Vec<ClassSlot>,
}

impl FixedStore {
    pub fn new(tasks: Vec<Task>, slots: Vec<ClassSlot>) -> Self {
        Self { tasks, slots }
    }
}

#[async_trait]
impl Store for FixedStore {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.clone())
    }

    async fn fetch_schedules_by_day(&self) -> Result<BTreeMap<String, Vec<ClassSlot>>, StoreError> {
        Ok(group_by_day(self.slots.iter().cloned()))
    }
}
