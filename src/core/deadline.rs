//! Deadline text parsing.
//!
//! Deadlines arrive from the store as free text. A fixed, ordered list of
//! layouts is tried in turn and the first one that parses wins. Layouts
//! without an offset are read as wall-clock time in the caller's zone.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use thiserror::Error;

/// Error returned when no accepted layout matches a deadline string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized deadline '{value}'")]
pub struct DeadlineParseError {
    /// The text that failed to parse.
    pub value: String,
}

/// A single accepted deadline layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineLayout {
    /// `2025-01-10T15:00`, as produced by HTML `datetime-local` inputs.
    DateTimeLocal,
    /// RFC 3339 with an explicit offset, e.g. `2025-01-10T15:00:00+07:00`.
    Rfc3339,
    /// `2025-01-10 15:00`.
    SpaceSeparated,
}

/// Accepted layouts in the order they are tried.
pub const ACCEPTED_LAYOUTS: [DeadlineLayout; 3] = [
    DeadlineLayout::DateTimeLocal,
    DeadlineLayout::Rfc3339,
    DeadlineLayout::SpaceSeparated,
];

impl DeadlineLayout {
    /// Try to parse `text` with this layout, interpreting naive times in `tz`.
    pub fn parse<Tz: TimeZone>(&self, text: &str, tz: &Tz) -> Option<DateTime<Tz>> {
        match self {
            DeadlineLayout::DateTimeLocal => parse_naive(text, "%Y-%m-%dT%H:%M", tz),
            DeadlineLayout::Rfc3339 => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(tz)),
            DeadlineLayout::SpaceSeparated => parse_naive(text, "%Y-%m-%d %H:%M", tz),
        }
    }
}

fn parse_naive<Tz: TimeZone>(text: &str, format: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(text, format).ok()?;
    // Ambiguous local times (DST fold) resolve to the earlier instant.
    tz.from_local_datetime(&naive).earliest()
}

/// Parse a deadline using the accepted layouts, first match wins.
pub fn parse_deadline<Tz: TimeZone>(text: &str, tz: &Tz) -> Result<DateTime<Tz>, DeadlineParseError> {
    let trimmed = text.trim();
    ACCEPTED_LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(trimmed, tz))
        .ok_or_else(|| DeadlineParseError {
            value: text.to_string(),
        })
}
