//! Fan-out of reminders to the event bus and the desktop.

use std::sync::Arc;

use crate::events::{Event, EventBus};

use super::{NoopNotifier, Notification, NotifyError, OsNotifier};

/// Publishes reminders on the bus and forwards them to an OS notifier.
///
/// Both legs are best effort. The bus emission always happens first and is
/// never undone by a desktop failure.
#[derive(Clone)]
pub struct NotificationDispatcher {
    event_bus: Arc<EventBus>,
    notifier: Arc<dyn OsNotifier>,
}

impl NotificationDispatcher {
    /// Create a dispatcher.
    pub fn new(event_bus: Arc<EventBus>, notifier: Arc<dyn OsNotifier>) -> Self {
        Self {
            event_bus,
            notifier,
        }
    }

    /// Dispatcher that only publishes on the bus.
    pub fn bus_only(event_bus: Arc<EventBus>) -> Self {
        Self::new(event_bus, Arc::new(NoopNotifier))
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Deliver a notification.
    ///
    /// A desktop failure is logged and returned for accounting; the bus
    /// emission has already happened by then.
    pub async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.event_bus
            .emit(Event::reminder(
                notification.title.clone(),
                notification.message.clone(),
            ))
            .await;

        if let Err(e) = self.notifier.notify(notification).await {
            tracing::warn!(
                notifier = self.notifier.name(),
                title = %notification.title,
                error = %e,
                "Desktop notification failed"
            );
            return Err(e);
        }
        Ok(())
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::bus_only(Arc::new(EventBus::new()))
    }
}
