//! Application event bus.
//!
//! Reminders are published here for the UI under the `reminder` topic, and
//! the scheduler announces its own lifecycle on the same bus.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Topic carrying reminder payloads.
pub const TOPIC_REMINDER: &str = "reminder";
/// Topic emitted when the scheduler loop starts.
pub const TOPIC_SCHEDULER_STARTED: &str = "scheduler.started";
/// Topic emitted when the scheduler loop stops.
pub const TOPIC_SCHEDULER_STOPPED: &str = "scheduler.stopped";

/// Payload delivered to the UI for each reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub title: String,
    pub message: String,
}

/// Events published on the bus.
#[derive(Debug, Clone)]
pub enum Event {
    /// A reminder was dispatched.
    Reminder {
        payload: ReminderPayload,
        timestamp: Instant,
    },

    /// The scheduler loop started.
    SchedulerStarted {
        tick_interval: Duration,
        timestamp: Instant,
    },

    /// The scheduler loop stopped after cancellation.
    SchedulerStopped {
        /// Number of ticks run before stopping.
        ticks: u64,
        timestamp: Instant,
    },
}

impl Event {
    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> Instant {
        match self {
            Event::Reminder { timestamp, .. } => *timestamp,
            Event::SchedulerStarted { timestamp, .. } => *timestamp,
            Event::SchedulerStopped { timestamp, .. } => *timestamp,
        }
    }

    /// Topic name this event is published under.
    pub fn topic(&self) -> &'static str {
        match self {
            Event::Reminder { .. } => TOPIC_REMINDER,
            Event::SchedulerStarted { .. } => TOPIC_SCHEDULER_STARTED,
            Event::SchedulerStopped { .. } => TOPIC_SCHEDULER_STOPPED,
        }
    }

    /// Create a Reminder event.
    pub fn reminder(title: impl Into<String>, message: impl Into<String>) -> Self {
        Event::Reminder {
            payload: ReminderPayload {
                title: title.into(),
                message: message.into(),
            },
            timestamp: Instant::now(),
        }
    }

    /// Create a SchedulerStarted event.
    pub fn scheduler_started(tick_interval: Duration) -> Self {
        Event::SchedulerStarted {
            tick_interval,
            timestamp: Instant::now(),
        }
    }

    /// Create a SchedulerStopped event.
    pub fn scheduler_stopped(ticks: u64) -> Self {
        Event::SchedulerStopped {
            ticks,
            timestamp: Instant::now(),
        }
    }
}

/// Handler for receiving bus events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle an event.
    async fn handle(&self, event: &Event);
}

/// Event bus for distributing events to registered handlers.
pub struct EventBus {
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
}

impl EventBus {
    /// Create a new event bus with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Register an event handler.
    pub async fn register(&self, handler: Arc<dyn EventHandler>) {
        let mut handlers = self.handlers.write().await;
        handlers.push(handler);
    }

    /// Emit an event to all registered handlers.
    pub async fn emit(&self, event: Event) {
        let handlers = self.handlers.read().await;
        for handler in handlers.iter() {
            handler.handle(&event).await;
        }
    }

    /// Get the number of registered handlers.
    pub async fn handler_count(&self) -> usize {
        self.handlers.read().await.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
