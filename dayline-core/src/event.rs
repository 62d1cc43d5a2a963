//! Event types.
//!
//! `RawEvent` mirrors what a calendar provider hands back (Google's
//! `events#event` shape, with every field optional). The normalizer turns it
//! into a `NormalizedEvent`, the only shape the rest of the engine works with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A provider-shaped event, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub start: Option<RawEventTime>,
    pub end: Option<RawEventTime>,
    pub organizer: Option<RawOrganizer>,
}

/// Start or end of a raw event: either a timed instant or an all-day date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    /// RFC 3339 timestamp, e.g. `2025-03-20T15:00:00+01:00`
    pub date_time: Option<String>,
    /// All-day date, `YYYY-MM-DD`
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrganizer {
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// A calendar event in the canonical shape used by the timeline and clock.
///
/// `duration_minutes` is not clamped: an event whose end is not after its start
/// keeps a zero or negative duration and is never considered current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub id: String,
    pub title: String,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
    pub all_day: bool,
    pub source_calendar_id: String,
    pub source_calendar_label: String,
    pub organizer_email: String,
}

impl NormalizedEvent {
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }

    /// Whether `now` falls inside `[start, end)`.
    pub fn is_current_at(&self, now: DateTime<Utc>) -> bool {
        self.duration_ms() > 0 && self.start <= now && now < self.end
    }

    pub fn is_future_at(&self, now: DateTime<Utc>) -> bool {
        now < self.start
    }
}

impl fmt::Display for NormalizedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "Untitled Event")
        } else {
            write!(f, "{}", self.title)
        }
    }
}
