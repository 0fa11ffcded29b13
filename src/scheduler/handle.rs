//! Scheduler handle for observing and stopping the reminder loop.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::types::SchedulerState;

/// Handle for controlling a started scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    pub(crate) cancel: CancellationToken,
    pub(crate) state: Arc<RwLock<SchedulerState>>,
}

impl SchedulerHandle {
    /// Request shutdown.
    ///
    /// A tick already in progress runs to completion first. Await the join
    /// handle returned by `start` to wait for the loop to exit.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Check if shutdown was requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Get the current scheduler state.
    pub async fn state(&self) -> SchedulerState {
        *self.state.read().await
    }

    /// Check if the scheduler is running.
    pub async fn is_running(&self) -> bool {
        *self.state.read().await == SchedulerState::Running
    }
}
