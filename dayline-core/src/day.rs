//! Local-day arithmetic.
//!
//! Everything "today" is measured in the viewer's timezone; instants handed
//! back are UTC so they compare directly against event times.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// The instant at `hour:00` local time on `date`.
///
/// A wall-clock time skipped by a DST jump resolves to the first valid instant
/// after it; an ambiguous one resolves to the earlier instant.
pub fn local_instant<Tz: TimeZone>(tz: &Tz, date: NaiveDate, hour: u32) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour));
    resolve_local(tz, naive)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.with_timezone(&Utc);
    }

    // Inside a DST gap
    let later = naive + Duration::hours(1);
    tz.from_local_datetime(&later)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Local midnight starting the day that contains `now`.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    local_instant(&now.timezone(), now.date_naive(), 0)
}

/// Local midnight starting the day after the one that contains `now`.
pub fn start_of_next_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let tomorrow = next_date(now.date_naive());
    local_instant(&now.timezone(), tomorrow, 0)
}

pub fn next_date(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX)
}

pub fn previous_date(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN)
}

/// 366 when the year has a 29th of February, else 365.
pub fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn day_bounds_follow_local_midnight() {
        let now = Berlin.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        assert_eq!(
            start_of_day(&now),
            Utc.with_ymd_and_hms(2025, 6, 9, 22, 0, 0).unwrap()
        );
        assert_eq!(
            start_of_next_day(&now),
            Utc.with_ymd_and_hms(2025, 6, 10, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn skipped_hour_resolves_after_the_gap() {
        // Berlin jumps from 02:00 to 03:00 on 2025-03-30
        let date = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
        assert_eq!(
            local_instant(&Berlin, date, 2),
            Utc.with_ymd_and_hms(2025, 3, 30, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn leap_years() {
        assert_eq!(days_in_year(2024), 366);
        assert_eq!(days_in_year(2025), 365);
        assert_eq!(days_in_year(1900), 365);
        assert_eq!(days_in_year(2000), 366);
    }
}
