//! Day-progress statistics.
//!
//! Computed from `now` and the active window only; the event list plays no part.

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::day::{days_in_year, local_instant, next_date, previous_date};
use crate::error::{DaylineError, DaylineResult};

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;

/// The local daily span, wake hour to sleep hour, that "day progress" measures.
///
/// A sleep hour earlier than the wake hour means the window runs past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    wake_hour: u32,
    sleep_hour: u32,
}

impl Default for ActiveWindow {
    fn default() -> Self {
        ActiveWindow {
            wake_hour: 7,
            sleep_hour: 23,
        }
    }
}

impl ActiveWindow {
    pub fn new(wake_hour: u32, sleep_hour: u32) -> DaylineResult<Self> {
        if wake_hour > 23 || sleep_hour > 23 {
            return Err(DaylineError::Config(format!(
                "wake and sleep hours must be 0-23, got {wake_hour} and {sleep_hour}"
            )));
        }
        if wake_hour == sleep_hour {
            return Err(DaylineError::Config(
                "wake and sleep hours must differ".into(),
            ));
        }
        Ok(ActiveWindow {
            wake_hour,
            sleep_hour,
        })
    }

    pub fn wake_hour(&self) -> u32 {
        self.wake_hour
    }

    pub fn sleep_hour(&self) -> u32 {
        self.sleep_hour
    }

    /// Today's wake instant, regardless of which side of midnight `now` is on.
    pub fn wake_today<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Utc> {
        local_instant(&now.timezone(), now.date_naive(), self.wake_hour)
    }

    /// The window `now` is measured against.
    pub fn bounds<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
        let tz = now.timezone();
        let today = now.date_naive();
        let mut start_date = today;
        let mut end_date = today;

        if self.sleep_hour < self.wake_hour {
            if now.hour() < self.wake_hour {
                start_date = previous_date(today);
            } else {
                end_date = next_date(today);
            }
        }

        (
            local_instant(&tz, start_date, self.wake_hour),
            local_instant(&tz, end_date, self.sleep_hour),
        )
    }

    fn label(hour: u32) -> String {
        NaiveTime::from_hms_opt(hour, 0, 0)
            .map(|t| t.format("%I:%M %p").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    /// Share of the active window already behind us, 0 to 100.
    pub percent_of_window_elapsed: f64,
    pub hours_left: i64,
    pub minutes_left: i64,
    pub day_of_year: u32,
    pub days_in_year: u32,
    pub days_remaining_in_year: u32,
    pub active_window_hours: f64,
    pub window_start_label: String,
    pub window_end_label: String,
}

impl DayStats {
    pub fn compute<Tz: TimeZone>(now: &DateTime<Tz>, window: ActiveWindow) -> Self {
        let (start, end) = window.bounds(now);
        let now_utc = now.with_timezone(&Utc);

        let total_ms = (end - start).num_milliseconds();
        let passed_ms = (now_utc - start).num_milliseconds();
        let percent = if total_ms > 0 {
            (passed_ms as f64 / total_ms as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };

        let left_ms = (end - now_utc).num_milliseconds().max(0);

        let day_of_year = now.ordinal();
        let days_in_year = days_in_year(now.year());

        DayStats {
            percent_of_window_elapsed: percent,
            hours_left: left_ms / MS_PER_HOUR,
            minutes_left: (left_ms % MS_PER_HOUR) / MS_PER_MINUTE,
            day_of_year,
            days_in_year,
            days_remaining_in_year: days_in_year.saturating_sub(day_of_year),
            active_window_hours: total_ms as f64 / MS_PER_HOUR as f64,
            window_start_label: ActiveWindow::label(window.wake_hour),
            window_end_label: ActiveWindow::label(window.sleep_hour),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, h, m, 0).unwrap()
    }

    #[test]
    fn midday_progress() {
        let stats = DayStats::compute(&at(15, 0), ActiveWindow::default());
        assert_eq!(stats.percent_of_window_elapsed, 50.0);
        assert_eq!(stats.hours_left, 8);
        assert_eq!(stats.minutes_left, 0);
        assert_eq!(stats.active_window_hours, 16.0);
        assert_eq!(stats.window_start_label, "07:00 AM");
        assert_eq!(stats.window_end_label, "11:00 PM");
    }

    #[test]
    fn percent_is_clamped_outside_the_window() {
        let early = DayStats::compute(&at(5, 0), ActiveWindow::default());
        assert_eq!(early.percent_of_window_elapsed, 0.0);

        let late = DayStats::compute(&at(23, 45), ActiveWindow::default());
        assert_eq!(late.percent_of_window_elapsed, 100.0);
        assert_eq!(late.hours_left, 0);
        assert_eq!(late.minutes_left, 0);
    }

    #[test]
    fn percent_stays_in_range_all_day() {
        for hour in 0..24 {
            for minute in [0, 29, 59] {
                let stats = DayStats::compute(&at(hour, minute), ActiveWindow::default());
                assert!((0.0..=100.0).contains(&stats.percent_of_window_elapsed));
            }
        }
    }

    #[test]
    fn minutes_left_floor() {
        let stats = DayStats::compute(&at(20, 30), ActiveWindow::default());
        assert_eq!(stats.hours_left, 2);
        assert_eq!(stats.minutes_left, 30);
    }

    #[test]
    fn year_counters() {
        let leap = Utc.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap();
        let stats = DayStats::compute(&leap, ActiveWindow::default());
        assert_eq!(stats.day_of_year, 366);
        assert_eq!(stats.days_in_year, 366);
        assert_eq!(stats.days_remaining_in_year, 0);

        let plain = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
        let stats = DayStats::compute(&plain, ActiveWindow::default());
        assert_eq!(stats.day_of_year, 32);
        assert_eq!(stats.days_in_year, 365);
        assert_eq!(stats.days_remaining_in_year, 333);
    }

    #[test]
    fn window_across_midnight() {
        let night_owl = ActiveWindow::new(10, 2).unwrap();

        let (start, end) = night_owl.bounds(&at(23, 0));
        assert_eq!(start, at(10, 0));
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 21, 2, 0, 0).unwrap());

        let (start, end) = night_owl.bounds(&at(1, 0));
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 19, 10, 0, 0).unwrap());
        assert_eq!(end, at(2, 0));

        let stats = DayStats::compute(&at(1, 0), night_owl);
        assert_eq!(stats.active_window_hours, 16.0);
        assert_eq!(stats.hours_left, 1);
    }

    #[test]
    fn rejects_invalid_windows() {
        assert!(ActiveWindow::new(24, 3).is_err());
        assert!(ActiveWindow::new(8, 8).is_err());
    }
}
