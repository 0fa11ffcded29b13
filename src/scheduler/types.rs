//! Scheduler type definitions.
//!
//! This module contains the error type, the lifecycle state enum and the
//! per-tick report.

use std::time::Duration;
use thiserror::Error;

use crate::core::window::DUE_WINDOW_SECS;
use crate::storage::StoreError;

use super::debounce::Entity;

/// Default time between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Longest tick interval that cannot step over a due window.
pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(DUE_WINDOW_SECS as u64);

/// Errors that can occur in the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Tick interval is zero or wider than the due window.
    #[error("invalid tick interval {0:?}: must be between 1ms and {max:?}", max = MAX_TICK_INTERVAL)]
    InvalidTickInterval(Duration),
}

/// State of the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchedulerState {
    /// Built but not started.
    #[default]
    Idle,
    /// Loop is running.
    Running,
    /// Loop ended after cancellation. Terminal.
    Stopped,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tasks evaluated.
    pub tasks_checked: usize,
    /// Class slots evaluated.
    pub slots_checked: usize,
    /// Entities notified this tick, in evaluation order.
    pub notified: Vec<Entity>,
    /// Entities that were due but already notified in this window.
    pub suppressed: usize,
    /// Debounce entries dropped because their window closed.
    pub cleared: usize,
    /// Tasks skipped because their deadline could not be parsed.
    pub unparseable: usize,
    /// Notifications whose desktop delivery failed.
    pub delivery_failures: usize,
}

impl TickReport {
    /// Number of notifications sent.
    pub fn notified_count(&self) -> usize {
        self.notified.len()
    }
}
