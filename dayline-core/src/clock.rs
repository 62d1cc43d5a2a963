//! Live clock driver.
//!
//! Every tick rebuilds the schedule from scratch, derives the live metrics of
//! each event and raises at-most-once side-effect signals. The only state kept
//! between ticks is which notifications and cues already fired.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::day_stats::{ActiveWindow, DayStats};
use crate::event::NormalizedEvent;
use crate::timeline::{self, TimelineItem};

/// How long before its start an event triggers a notification.
pub const NOTIFY_LEAD_MS: i64 = 60_000;

/// Remaining-time window (exclusive low, inclusive high) for the audio cue.
/// One second wide so a once-a-second tick always lands in it exactly once.
const CUE_WINDOW_MS: (i64, i64) = (4_000, 5_000);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub elapsed_ms: i64,
    pub remaining_ms: i64,
    /// 0 to 100
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Current(LiveMetrics),
    Upcoming { starts_in_ms: i64 },
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// The event starts within a minute.
    Notify(NormalizedEvent),
    /// The event ends in about five seconds.
    PlayCue(NormalizedEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEntry {
    pub item: TimelineItem,
    /// `None` for gaps.
    pub phase: Option<Phase>,
}

/// Everything one tick produces for the presentation surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub now: DateTime<Utc>,
    pub entries: Vec<FrameEntry>,
    pub stats: DayStats,
    pub signals: Vec<Signal>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Elapsed/remaining/percent for an event that is current at `now`.
pub fn live_metrics(event: &NormalizedEvent, now: DateTime<Utc>) -> Option<LiveMetrics> {
    if !event.is_current_at(now) {
        return None;
    }

    let total_ms = event.duration_ms();
    let elapsed_ms = (now - event.start).num_milliseconds();
    let remaining_ms = (event.end - now).num_milliseconds();
    let percent = (elapsed_ms as f64 / total_ms as f64 * 100.0).clamp(0.0, 100.0);

    Some(LiveMetrics {
        elapsed_ms,
        remaining_ms,
        percent,
    })
}

pub fn phase(event: &NormalizedEvent, now: DateTime<Utc>) -> Phase {
    if let Some(metrics) = live_metrics(event, now) {
        Phase::Current(metrics)
    } else if event.is_future_at(now) {
        Phase::Upcoming {
            starts_in_ms: (event.start - now).num_milliseconds(),
        }
    } else {
        Phase::Ended
    }
}

/// Per-view driver. Dropping it and creating a new one resets which
/// notifications and cues have fired.
#[derive(Debug, Default)]
pub struct LiveClock {
    window: ActiveWindow,
    /// Keyed by title: two events sharing a title share one notification.
    notified: HashSet<String>,
    cued: HashSet<(String, DateTime<Utc>)>,
}

impl LiveClock {
    pub fn new(window: ActiveWindow) -> Self {
        LiveClock {
            window,
            notified: HashSet::new(),
            cued: HashSet::new(),
        }
    }

    pub fn window(&self) -> ActiveWindow {
        self.window
    }

    pub fn tick<Tz: TimeZone>(&mut self, now: &DateTime<Tz>, events: &[NormalizedEvent]) -> Frame {
        let schedule = timeline::build(events, now, self.window);
        let now = now.with_timezone(&Utc);
        let mut signals = Vec::new();

        let entries = schedule
            .items
            .into_iter()
            .map(|item| {
                let phase = item.event().map(|event| {
                    let current = phase(event, now);
                    signals.extend(self.signal_for(event, &current));
                    current
                });
                FrameEntry { item, phase }
            })
            .collect();

        Frame {
            now,
            entries,
            stats: schedule.stats,
            signals,
        }
    }

    fn signal_for(&mut self, event: &NormalizedEvent, phase: &Phase) -> Option<Signal> {
        match *phase {
            Phase::Current(metrics) => {
                let (low, high) = CUE_WINDOW_MS;
                let in_window = metrics.remaining_ms > low && metrics.remaining_ms <= high;
                (in_window && self.cued.insert((event.id.clone(), event.start)))
                    .then(|| Signal::PlayCue(event.clone()))
            }
            Phase::Upcoming { starts_in_ms } => {
                let due = starts_in_ms <= NOTIFY_LEAD_MS;
                (due && self.notified.insert(event.title.clone()))
                    .then(|| Signal::Notify(event.clone()))
            }
            Phase::Ended => None,
        }
    }
}
