//! Weekly class slots.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::types::SlotId;

/// Indonesian day labels, Monday first.
const INDONESIAN_DAYS: [(&str, Weekday); 7] = [
    ("senin", Weekday::Mon),
    ("selasa", Weekday::Tue),
    ("rabu", Weekday::Wed),
    ("kamis", Weekday::Thu),
    ("jumat", Weekday::Fri),
    ("sabtu", Weekday::Sat),
    ("minggu", Weekday::Sun),
];

/// English day labels, Monday first.
const ENGLISH_DAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Map a weekday label to a canonical weekday.
///
/// Accepts Indonesian (`Senin`..`Minggu`) and English (`Monday`..`Sunday`)
/// labels, case-insensitive. Unknown labels return `None`.
pub fn parse_weekday(label: &str) -> Option<Weekday> {
    let label = label.trim().to_lowercase();
    INDONESIAN_DAYS
        .iter()
        .chain(ENGLISH_DAYS.iter())
        .find(|(name, _)| *name == label)
        .map(|(_, day)| *day)
}

/// Parse a slot start time in `HH:MM` form. A trailing `:SS` is accepted.
pub fn parse_start_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

/// A recurring weekly class slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSlot {
    pub id: SlotId,
    /// Day label, e.g. `Senin` or `Monday`.
    pub weekday: String,
    pub subject: String,
    /// Start time as `HH:MM`.
    pub start_time: String,
    /// Lead time before the start, in minutes.
    #[serde(default)]
    pub reminder_minutes: u32,
}

impl ClassSlot {
    /// Create a slot with no lead time.
    pub fn new(
        id: impl Into<SlotId>,
        weekday: impl Into<String>,
        subject: impl Into<String>,
        start_time: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            weekday: weekday.into(),
            subject: subject.into(),
            start_time: start_time.into(),
            reminder_minutes: 0,
        }
    }

    /// Set the reminder lead time.
    pub fn with_reminder_minutes(mut self, minutes: u32) -> Self {
        self.reminder_minutes = minutes;
        self
    }

    /// The weekday this slot recurs on, if the label is recognized.
    pub fn day(&self) -> Option<Weekday> {
        parse_weekday(&self.weekday)
    }
}
