//! Time window for fetching events.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::day::{start_of_day, start_of_next_day};

/// Half-open fetch window `[from, to)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        DateRange { from, to }
    }

    /// The local day containing `now`, from midnight to the next midnight.
    pub fn today<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        DateRange {
            from: start_of_day(now),
            to: start_of_next_day(now),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    #[test]
    fn today_is_local_day() {
        let now = New_York.with_ymd_and_hms(2025, 1, 15, 23, 30, 0).unwrap();
        let range = DateRange::today(&now);
        assert_eq!(range.from, Utc.with_ymd_and_hms(2025, 1, 15, 5, 0, 0).unwrap());
        assert_eq!(range.to, Utc.with_ymd_and_hms(2025, 1, 16, 5, 0, 0).unwrap());
        assert!(range.contains(now.with_timezone(&Utc)));
        assert!(!range.contains(range.to));
    }
}
