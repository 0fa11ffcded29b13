//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeDelta, TimeZone};
use duebell::testing::RecordingNotifier;
use duebell::{EventBus, NotificationDispatcher};
use std::sync::Arc;
use std::time::Duration;

/// Deadline text `offset` from now in RFC 3339, local offset.
pub fn local_deadline_in(offset: TimeDelta) -> String {
    (Local::now() + offset).to_rfc3339()
}

/// An instant in UTC+7.
pub fn wib(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
    let naive = NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap();
    FixedOffset::east_opt(7 * 3600)
        .unwrap()
        .from_local_datetime(&naive)
        .unwrap()
}

/// Dispatcher publishing to a fresh bus and recording desktop notifications.
pub fn recording_dispatcher() -> (NotificationDispatcher, Arc<EventBus>, Arc<RecordingNotifier>) {
    let bus = Arc::new(EventBus::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let dispatcher = NotificationDispatcher::new(Arc::clone(&bus), notifier.clone());
    (dispatcher, bus, notifier)
}

/// Poll `condition` every 10ms until it holds.
///
/// # Panics
///
/// Panics if `timeout` elapses first.
pub async fn wait_until(mut condition: impl FnMut() -> bool, timeout: Duration, what: &str) {
    let start = tokio::time::Instant::now();
    while !condition() {
        if start.elapsed() > timeout {
            panic!("Timeout waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
