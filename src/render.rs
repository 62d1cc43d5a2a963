//! Terminal rendering for dayline frames.
//!
//! This module provides extension traits that add colored terminal rendering
//! to dayline-core types using owo_colors.

use chrono::{DateTime, TimeZone, Utc};
use dayline_core::aggregate::Aggregation;
use dayline_core::clock::{Frame, FrameEntry, LiveMetrics, Phase};
use dayline_core::day_stats::DayStats;
use dayline_core::timeline::TimelineItem;
use owo_colors::OwoColorize;

const BAR_WIDTH: usize = 20;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display;
}

impl Render for Frame {
    fn render<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut lines = vec![
            format!(
                "{} {}",
                "Today".bold(),
                format_clock(&self.now, tz).dimmed()
            ),
            self.stats.render(tz),
            String::new(),
        ];

        if self.is_empty() {
            lines.push("No more events for today.".dimmed().to_string());
        } else {
            lines.extend(self.entries.iter().map(|entry| entry.render(tz)));
        }

        lines.join("\n")
    }
}

impl Render for DayStats {
    fn render<Tz: TimeZone>(&self, _tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!(
            "{} {:.0}% of {} to {} · {}h {}m left · day {}/{} ({} left)",
            progress_bar(self.percent_of_window_elapsed),
            self.percent_of_window_elapsed,
            self.window_start_label,
            self.window_end_label,
            self.hours_left,
            self.minutes_left,
            self.day_of_year,
            self.days_in_year,
            self.days_remaining_in_year,
        )
        .dimmed()
        .to_string()
    }
}

impl Render for FrameEntry {
    fn render<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        match (&self.item, &self.phase) {
            (TimelineItem::Gap { start, end, duration_minutes }, _) => format!(
                "  {} {}",
                format_span(start, end, tz).dimmed(),
                format!("Free for {}", format_minutes(*duration_minutes)).green()
            ),
            (TimelineItem::Event { event, overlapped }, phase) => {
                let title = event.to_string();
                let span = if event.all_day {
                    format!("{:<17}", "all-day")
                } else {
                    format_span(&event.start, &event.end, tz)
                };
                let overlap = if *overlapped {
                    format!(" {}", "overlaps".red())
                } else {
                    String::new()
                };
                let location = event
                    .location
                    .as_deref()
                    .map(|l| format!(" @ {l}"))
                    .unwrap_or_default();
                let source = format!("[{}]", event.source_calendar_label);

                let mut line = match phase {
                    Some(Phase::Current(_)) => format!("▶ {} {}", span.bold(), title.bold()),
                    _ => format!("  {} {}", span, title),
                };
                line.push_str(&format!("{}{} {}", location.dimmed(), overlap, source.dimmed()));

                match phase {
                    Some(Phase::Current(metrics)) => {
                        line.push('\n');
                        line.push_str(&format!("    {}", render_metrics(metrics)));
                    }
                    Some(Phase::Upcoming { starts_in_ms }) => {
                        line.push_str(&format!(
                            " {}",
                            format!("in {}", format_countdown(*starts_in_ms)).cyan()
                        ));
                    }
                    _ => {}
                }

                line
            }
        }
    }
}

fn render_metrics(metrics: &LiveMetrics) -> String {
    format!(
        "{} {:.0}% · {} elapsed · {} left",
        progress_bar(metrics.percent).yellow(),
        metrics.percent,
        format_countdown(metrics.elapsed_ms),
        format_countdown(metrics.remaining_ms).bold()
    )
}

/// Summary of sources that could not be shown.
pub fn render_problems(aggregation: &Aggregation) -> Vec<String> {
    let mut lines: Vec<String> = aggregation
        .failures
        .iter()
        .map(|failure| {
            format!("{} {}: {}", "!".yellow(), failure.source_id, failure.error)
        })
        .collect();

    if !aggregation.rejections.is_empty() {
        lines.push(
            format!(
                "{} skipped {} malformed {}",
                "!".yellow(),
                aggregation.rejections.len(),
                pluralize("event", aggregation.rejections.len())
            )
            .dimmed()
            .to_string(),
        );
    }

    lines
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// 12-hour wall-clock time, e.g. "09:05 AM".
pub fn format_clock<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.with_timezone(tz).format("%I:%M %p").to_string()
}

fn format_span<Tz: TimeZone>(start: &DateTime<Utc>, end: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}–{}", format_clock(start, tz), format_clock(end, tz))
}

/// Compact countdown: "1h 05m", "4m 07s", "12s".
pub fn format_countdown(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

/// "45 min", "2h", "1h 30min".
pub fn format_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;

    match (hours, rest) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}min"),
    }
}

pub fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_formats() {
        assert_eq!(format_countdown(0), "0s");
        assert_eq!(format_countdown(12_999), "12s");
        assert_eq!(format_countdown(247_000), "4m 07s");
        assert_eq!(format_countdown(3_900_000), "1h 05m");
        assert_eq!(format_countdown(-5_000), "0s");
    }

    #[test]
    fn minute_formats() {
        assert_eq!(format_minutes(45), "45 min");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(90), "1h 30min");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(100.0), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(
            progress_bar(50.0),
            format!("[{}{}]", "#".repeat(10), "-".repeat(10))
        );
        assert_eq!(progress_bar(250.0), progress_bar(100.0));
    }

    #[test]
    fn clock_uses_viewer_timezone() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 20, 14, 5, 0).unwrap();
        assert_eq!(format_clock(&instant, &chrono_tz::Europe::Berlin), "03:05 PM");
        assert_eq!(format_clock(&instant, &Utc), "02:05 PM");
    }
}
