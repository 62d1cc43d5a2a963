//! Raw event → `NormalizedEvent`.
//!
//! Timed fields win over all-day fields. An all-day date becomes local
//! midnight in the viewer's timezone. Nothing downstream looks at the raw shape.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::day::local_instant;
use crate::error::NormalizeError;
use crate::event::{NormalizedEvent, RawEvent, RawEventTime};
use crate::source::CalendarSource;

const MS_PER_MINUTE: i64 = 60_000;

pub fn normalize<Tz: TimeZone>(
    raw: &RawEvent,
    source: &CalendarSource,
    tz: &Tz,
) -> Result<NormalizedEvent, NormalizeError> {
    let start = raw.start.as_ref().ok_or(NormalizeError::MissingStart)?;
    let end = raw.end.as_ref().ok_or(NormalizeError::MissingEnd)?;

    let (start, all_day) = resolve_time(start, "start", tz)?;
    let (end, _) = resolve_time(end, "end", tz)?;

    Ok(NormalizedEvent {
        id: raw.id.clone().unwrap_or_default(),
        title: raw.summary.clone().unwrap_or_default(),
        location: raw.location.clone().filter(|l| !l.is_empty()),
        start,
        end,
        duration_minutes: duration_minutes(start, end),
        all_day,
        source_calendar_id: source.id.clone(),
        source_calendar_label: source.display_name.clone(),
        organizer_email: raw
            .organizer
            .as_ref()
            .and_then(|o| o.email.clone())
            .unwrap_or_default(),
    })
}

/// Whole minutes between two instants, floored toward negative infinity.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds().div_euclid(MS_PER_MINUTE)
}

/// Returns the instant and whether it came from an all-day date.
fn resolve_time<Tz: TimeZone>(
    time: &RawEventTime,
    field: &'static str,
    tz: &Tz,
) -> Result<(DateTime<Utc>, bool), NormalizeError> {
    if let Some(ref value) = time.date_time {
        let parsed = DateTime::parse_from_rfc3339(value).map_err(|_| {
            NormalizeError::InvalidTime {
                field,
                value: value.clone(),
            }
        })?;
        return Ok((parsed.with_timezone(&Utc), false));
    }

    if let Some(ref value) = time.date {
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            NormalizeError::InvalidTime {
                field,
                value: value.clone(),
            }
        })?;
        return Ok((local_instant(tz, date, 0), true));
    }

    Err(match field {
        "start" => NormalizeError::MissingStart,
        _ => NormalizeError::MissingEnd,
    })
}
