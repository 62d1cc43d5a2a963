//! Today's schedule.
//!
//! `build` is a pure function of the merged event list, `now` and the active
//! window. It scopes events to the rest of today, orders them, flags adjacent
//! overlaps and inserts a free-time gap ahead of the first event.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::day_stats::{ActiveWindow, DayStats};
use crate::event::NormalizedEvent;
use crate::normalize::duration_minutes;

/// Shortest free time worth showing before the first event.
const MIN_GAP_MS: i64 = 60_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineItem {
    Event {
        event: NormalizedEvent,
        overlapped: bool,
    },
    Gap {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        duration_minutes: i64,
    },
}

impl TimelineItem {
    pub fn start(&self) -> DateTime<Utc> {
        match self {
            TimelineItem::Event { event, .. } => event.start,
            TimelineItem::Gap { start, .. } => *start,
        }
    }

    pub fn event(&self) -> Option<&NormalizedEvent> {
        match self {
            TimelineItem::Event { event, .. } => Some(event),
            TimelineItem::Gap { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub items: Vec<TimelineItem>,
    pub stats: DayStats,
}

impl Schedule {
    /// No events left today. Rendered as an explicit empty state.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &NormalizedEvent> {
        self.items.iter().filter_map(TimelineItem::event)
    }
}

pub fn build<Tz: TimeZone>(
    events: &[NormalizedEvent],
    now: &DateTime<Tz>,
    window: ActiveWindow,
) -> Schedule {
    let scheduled = scope(events, now);
    let overlaps = mark_overlaps(&scheduled);

    let mut items = Vec::with_capacity(scheduled.len() + 1);
    if let Some(first) = scheduled.first() {
        items.extend(leading_gap(first, now, window));
    }
    items.extend(
        scheduled
            .into_iter()
            .zip(overlaps)
            .map(|(event, overlapped)| TimelineItem::Event { event, overlapped }),
    );

    Schedule {
        items,
        stats: DayStats::compute(now, window),
    }
}

/// Events starting today that have not ended yet, sorted by start.
///
/// Events that already ended are dropped rather than shown as past.
pub fn scope<Tz: TimeZone>(events: &[NormalizedEvent], now: &DateTime<Tz>) -> Vec<NormalizedEvent> {
    let today = DateRange::today(now);
    let now = now.with_timezone(&Utc);

    let mut scheduled: Vec<NormalizedEvent> = events
        .iter()
        .filter(|e| today.contains(e.start) && e.end > now)
        .cloned()
        .collect();
    scheduled.sort_by_key(|e| e.start);
    scheduled
}

/// Overlap flags for an already sorted list.
///
/// Only neighbours are compared: an event that overlaps a later, non-adjacent
/// event is not flagged unless one of its neighbours overlaps it too.
pub fn mark_overlaps(sorted: &[NormalizedEvent]) -> Vec<bool> {
    let mut flags = vec![false; sorted.len()];
    for (i, pair) in sorted.windows(2).enumerate() {
        if pair[1].start < pair[0].end {
            flags[i] = true;
            flags[i + 1] = true;
        }
    }
    flags
}

/// Free time from today's wake hour to the first event, if there is any to show.
fn leading_gap<Tz: TimeZone>(
    first: &NormalizedEvent,
    now: &DateTime<Tz>,
    window: ActiveWindow,
) -> Option<TimelineItem> {
    let wake = window.wake_today(now);
    let now = now.with_timezone(&Utc);

    if now >= first.start || (first.start - wake).num_milliseconds() < MIN_GAP_MS {
        return None;
    }

    Some(TimelineItem::Gap {
        start: wake,
        end: first.start,
        duration_minutes: duration_minutes(wake, first.start),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, h, m, 0).unwrap()
    }

    fn event(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> NormalizedEvent {
        NormalizedEvent {
            id: title.to_lowercase(),
            title: title.into(),
            location: None,
            start,
            end,
            duration_minutes: duration_minutes(start, end),
            all_day: false,
            source_calendar_id: "primary".into(),
            source_calendar_label: "Personal".into(),
            organizer_email: String::new(),
        }
    }

    fn titles(schedule: &Schedule) -> Vec<&str> {
        schedule.events().map(|e| e.title.as_str()).collect()
    }

    fn overlap_flags(schedule: &Schedule) -> Vec<bool> {
        schedule
            .items
            .iter()
            .filter_map(|item| match item {
                TimelineItem::Event { overlapped, .. } => Some(*overlapped),
                TimelineItem::Gap { .. } => None,
            })
            .collect()
    }

    #[test]
    fn ended_events_are_dropped_and_no_gap_after_first_start() {
        let events = vec![
            event("Early", at(9, 0), at(10, 0)),
            event("Lunch", at(11, 0), at(13, 0)),
        ];
        let schedule = build(&events, &at(12, 0), ActiveWindow::default());

        assert_eq!(titles(&schedule), vec!["Lunch"]);
        assert!(!schedule.items.iter().any(|i| matches!(i, TimelineItem::Gap { .. })));
        assert_eq!(overlap_flags(&schedule), vec![false]);
    }

    #[test]
    fn adjacent_overlap_flags_both() {
        let events = vec![
            event("A", at(9, 0), at(10, 0)),
            event("B", at(9, 30), at(10, 30)),
        ];
        let schedule = build(&events, &at(8, 0), ActiveWindow::default());
        assert_eq!(overlap_flags(&schedule), vec![true, true]);
    }

    #[test]
    fn touching_events_do_not_overlap() {
        let events = vec![
            event("A", at(9, 0), at(10, 0)),
            event("B", at(10, 0), at(11, 0)),
        ];
        let schedule = build(&events, &at(8, 0), ActiveWindow::default());
        assert_eq!(overlap_flags(&schedule), vec![false, false]);
    }

    #[test]
    fn non_adjacent_overlap_is_not_flagged() {
        // A spans all of B and C, but C is only A's second neighbour
        let events = vec![
            event("A", at(9, 0), at(12, 0)),
            event("B", at(9, 30), at(9, 45)),
            event("C", at(11, 0), at(11, 30)),
        ];
        let schedule = build(&events, &at(8, 0), ActiveWindow::default());
        assert_eq!(titles(&schedule), vec!["A", "B", "C"]);
        assert_eq!(overlap_flags(&schedule), vec![true, true, false]);
    }

    #[test]
    fn gap_before_first_event() {
        let events = vec![event("Standup", at(9, 0), at(9, 15))];
        let schedule = build(&events, &at(7, 0), ActiveWindow::default());

        assert_eq!(
            schedule.items[0],
            TimelineItem::Gap {
                start: at(7, 0),
                end: at(9, 0),
                duration_minutes: 120,
            }
        );
        assert_eq!(schedule.items.len(), 2);
    }

    #[test]
    fn gap_keeps_wake_anchor_after_waking() {
        let events = vec![event("Standup", at(9, 0), at(9, 15))];
        let schedule = build(&events, &at(8, 30), ActiveWindow::default());
        assert!(matches!(
            schedule.items[0],
            TimelineItem::Gap { start, duration_minutes: 120, .. } if start == at(7, 0)
        ));
    }

    #[test]
    fn gap_needs_a_full_minute() {
        let events = vec![event("Early", at(7, 0) + Duration::seconds(59), at(8, 0))];
        let schedule = build(&events, &at(6, 0), ActiveWindow::default());
        assert_eq!(schedule.items.len(), 1);

        let events = vec![event("Early", at(7, 1), at(8, 0))];
        let schedule = build(&events, &at(6, 0), ActiveWindow::default());
        assert!(matches!(
            schedule.items[0],
            TimelineItem::Gap { duration_minutes: 1, .. }
        ));
    }

    #[test]
    fn event_before_wake_has_no_gap() {
        let events = vec![event("Gym", at(6, 0), at(7, 30))];
        let schedule = build(&events, &at(5, 0), ActiveWindow::default());
        assert_eq!(schedule.items.len(), 1);
    }

    #[test]
    fn at_most_one_gap() {
        let events = vec![
            event("A", at(9, 0), at(10, 0)),
            event("B", at(12, 0), at(13, 0)),
            event("C", at(16, 0), at(17, 0)),
        ];
        let schedule = build(&events, &at(7, 30), ActiveWindow::default());
        let gaps = schedule
            .items
            .iter()
            .filter(|i| matches!(i, TimelineItem::Gap { .. }))
            .count();
        assert_eq!(gaps, 1);
        assert!(matches!(schedule.items[0], TimelineItem::Gap { .. }));
    }

    #[test]
    fn output_is_sorted_regardless_of_input_order() {
        let mut events = vec![
            event("C", at(16, 0), at(17, 0)),
            event("A", at(9, 0), at(10, 0)),
            event("D", at(20, 0), at(21, 0)),
            event("B", at(12, 0), at(13, 0)),
        ];
        let now = at(8, 0);
        let expected = build(&events, &now, ActiveWindow::default());

        for _ in 0..events.len() {
            events.rotate_left(1);
            let schedule = build(&events, &now, ActiveWindow::default());
            let starts: Vec<_> = schedule.items.iter().map(TimelineItem::start).collect();
            assert!(starts.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!(schedule, expected);
        }
    }

    #[test]
    fn equal_starts_keep_input_order() {
        let events = vec![
            event("First", at(9, 0), at(10, 0)),
            event("Second", at(9, 0), at(9, 30)),
        ];
        let schedule = build(&events, &at(8, 0), ActiveWindow::default());
        assert_eq!(titles(&schedule), vec!["First", "Second"]);
    }

    #[test]
    fn only_events_starting_today() {
        let yesterday = at(9, 0) - Duration::days(1);
        let tomorrow = at(9, 0) + Duration::days(1);
        let events = vec![
            // Started yesterday, still running: not today's
            event("Overnight", yesterday, at(10, 0)),
            event("Today", at(9, 0), at(10, 0)),
            event("Tomorrow", tomorrow, tomorrow + Duration::hours(1)),
        ];
        let schedule = build(&events, &at(8, 0), ActiveWindow::default());
        assert_eq!(titles(&schedule), vec!["Today"]);
    }

    #[test]
    fn empty_when_nothing_left() {
        let events = vec![event("Done", at(9, 0), at(10, 0))];
        let schedule = build(&events, &at(18, 0), ActiveWindow::default());
        assert!(schedule.is_empty());
        assert_eq!(schedule.stats.hours_left, 5);
    }

    #[test]
    fn build_is_idempotent() {
        let events = vec![
            event("A", at(9, 0), at(10, 0)),
            event("B", at(9, 30), at(11, 0)),
        ];
        let now = at(7, 15);
        assert_eq!(
            build(&events, &now, ActiveWindow::default()),
            build(&events, &now, ActiveWindow::default())
        );
    }
}
