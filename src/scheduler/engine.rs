//! Reminder scheduler implementation.
//!
//! The scheduler is responsible for:
//! - Waking on a fixed interval until cancelled
//! - Evaluating every task and class slot against the current instant
//! - Firing each due window at most once
//! - Publishing its own lifecycle on the event bus

use chrono::{DateTime, Local, TimeZone};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::core::window::{evaluate_deadline, evaluate_slot};
use crate::events::{Event, EventBus};
use crate::notify::{Notification, NotificationDispatcher};
use crate::storage::Store;

use super::debounce::{DebounceTracker, Entity};
use super::handle::SchedulerHandle;
use super::types::{
    DEFAULT_TICK_INTERVAL, MAX_TICK_INTERVAL, SchedulerError, SchedulerState, TickReport,
};

/// Periodic reminder engine.
///
/// Owns the debounce tracker outright; only the loop (or a caller of
/// [`tick`](Self::tick)) ever mutates it.
pub struct ReminderScheduler<S: Store + ?Sized> {
    /// Planner store.
    store: Arc<S>,
    /// Where reminders go.
    dispatcher: NotificationDispatcher,
    /// Already-notified entities.
    tracker: DebounceTracker,
    /// Time between ticks.
    tick_interval: Duration,
    state: Arc<RwLock<SchedulerState>>,
}

impl<S: Store + ?Sized + 'static> ReminderScheduler<S> {
    /// Create a new scheduler with the given store.
    pub fn new(store: S) -> Self
    where
        S: Sized,
    {
        Self::with_store(Arc::new(store))
    }

    /// Create a new scheduler over a shared store.
    pub fn with_store(store: Arc<S>) -> Self {
        Self {
            store,
            dispatcher: NotificationDispatcher::default(),
            tracker: DebounceTracker::new(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            state: Arc::new(RwLock::new(SchedulerState::Idle)),
        }
    }

    /// Set the tick interval.
    ///
    /// Intervals wider than the due window are rejected since a tick could
    /// step over a whole window.
    pub fn with_tick_interval(mut self, interval: Duration) -> Result<Self, SchedulerError> {
        if interval.is_zero() || interval > MAX_TICK_INTERVAL {
            return Err(SchedulerError::InvalidTickInterval(interval));
        }
        self.tick_interval = interval;
        Ok(self)
    }

    /// Set the notification dispatcher.
    pub fn with_dispatcher(mut self, dispatcher: NotificationDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Get the tick interval.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Get the event bus reminders are published on.
    pub fn event_bus(&self) -> &Arc<EventBus> {
        self.dispatcher.event_bus()
    }

    /// Get the debounce tracker.
    pub fn tracker(&self) -> &DebounceTracker {
        &self.tracker
    }

    /// Get the current lifecycle state.
    pub async fn state(&self) -> SchedulerState {
        *self.state.read().await
    }

    /// Run one evaluation pass at `now`.
    ///
    /// A store failure aborts the pass before anything is evaluated.
    pub async fn tick<Tz: TimeZone>(
        &mut self,
        now: DateTime<Tz>,
    ) -> Result<TickReport, SchedulerError> {
        let tasks = self.store.fetch_tasks().await?;
        let days = self.store.fetch_schedules_by_day().await?;

        let mut report = TickReport::default();
        let mut present = HashSet::new();

        for task in &tasks {
            report.tasks_checked += 1;
            let entity = Entity::Task(task.id);
            present.insert(entity);

            match evaluate_deadline(task, &now) {
                Ok(window) if window.due => {
                    self.fire(entity, Notification::for_task(task), &mut report)
                        .await;
                }
                Ok(window) => {
                    if self.tracker.clear_if_expired(entity, &now, &window.reference) {
                        report.cleared += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(task_id = %task.id, title = %task.title, error = %e, "Skipping task with unparseable deadline");
                    report.unparseable += 1;
                    if self.tracker.forget(entity) {
                        report.cleared += 1;
                    }
                }
            }
        }

        for slot in days.values().flatten() {
            report.slots_checked += 1;
            let entity = Entity::Slot(slot.id);
            present.insert(entity);

            let window = evaluate_slot(slot, &now);
            if window.due {
                self.fire(entity, Notification::for_slot(slot), &mut report)
                    .await;
            } else {
                // No window today means any earlier window has long closed.
                let reference = window.window_end.unwrap_or_else(|| now.clone());
                if self.tracker.clear_if_expired(entity, &now, &reference) {
                    report.cleared += 1;
                }
            }
        }

        // Entities deleted from the store.
        report.cleared += self.tracker.retain(|entity| present.contains(&entity));

        tracing::debug!(
            now = %now.naive_local(),
            tasks = report.tasks_checked,
            slots = report.slots_checked,
            notified = report.notified_count(),
            suppressed = report.suppressed,
            cleared = report.cleared,
            "Reminder tick complete"
        );
        Ok(report)
    }

    async fn fire(&mut self, entity: Entity, notification: Notification, report: &mut TickReport) {
        if !self.tracker.should_notify(entity) {
            report.suppressed += 1;
            return;
        }

        tracing::info!(entity = %entity, title = %notification.title, message = %notification.message, "Sending reminder");
        if self.dispatcher.notify(&notification).await.is_err() {
            report.delivery_failures += 1;
        }
        self.tracker.mark_notified(entity);
        report.notified.push(entity);
    }

    /// Start the loop and return a handle for controlling it.
    ///
    /// The first tick happens one interval after start. The loop stops when
    /// `cancel` is cancelled, either directly or through the handle.
    pub async fn start(mut self, cancel: CancellationToken) -> (SchedulerHandle, JoinHandle<()>) {
        self.tracker.reset();
        *self.state.write().await = SchedulerState::Running;

        let handle = SchedulerHandle {
            cancel: cancel.clone(),
            state: Arc::clone(&self.state),
        };

        let scheduler_task = tokio::spawn(async move {
            self.run(cancel).await;
        });

        (handle, scheduler_task)
    }

    /// Main loop.
    async fn run(mut self, cancel: CancellationToken) {
        let first = tokio::time::Instant::now() + self.tick_interval;
        let mut interval = tokio::time::interval_at(first, self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval = ?self.tick_interval, "Reminder scheduler started");
        self.event_bus()
            .emit(Event::scheduler_started(self.tick_interval))
            .await;

        let mut ticks: u64 = 0;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,

                _ = interval.tick() => {
                    ticks += 1;
                    if let Err(e) = self.tick(Local::now()).await {
                        tracing::warn!(error = %e, "Reminder tick aborted");
                    }
                }
            }
        }

        *self.state.write().await = SchedulerState::Stopped;
        tracing::info!(ticks, "Reminder scheduler stopped");
        self.event_bus().emit(Event::scheduler_stopped(ticks)).await;
    }
}
