//! Live view: redraws once a second until Ctrl-C.
//!
//! Typing `select id1,id2` or `all` on stdin changes which calendars are
//! shown without restarting. Reloads run next to the tick loop; until one
//! finishes the previous events stay on screen.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use dayline_core::clock::Signal;
use dayline_core::error::DaylineResult;
use dayline_core::progress::CosmeticProgress;
use dayline_core::viewer::{Loaded, PendingLoad};
use owo_colors::OwoColorize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::commands::{DayViewer, load_viewer, with_reauth_hint};
use crate::config::DaylineConfig;
use crate::render::{Render, render_problems};

const TICK: Duration = Duration::from_secs(1);

/// Clear the screen and move the cursor home.
const CLEAR: &str = "\x1b[2J\x1b[H";
const BELL: &str = "\x07";

type Selection = Option<Vec<String>>;

/// A reload running alongside the tick loop.
struct Fetch {
    selection: Selection,
    started: Instant,
    load: PendingLoad,
}

pub async fn run(config: &DaylineConfig) -> Result<()> {
    let mut viewer = load_viewer(config).await?;

    let (selection_tx, selection_rx) = watch::channel(viewer.selection().map(<[String]>::to_vec));
    spawn_selection_reader(selection_tx)?;

    run_ticks(&mut viewer, config, selection_rx).await
}

async fn run_ticks(
    viewer: &mut DayViewer,
    config: &DaylineConfig,
    mut selection_rx: watch::Receiver<Selection>,
) -> Result<()> {
    let mut ticker = tokio::time::interval(TICK);
    let mut fetch: Option<Fetch> = None;
    let mut selection_open = true;
    let progress = CosmeticProgress::default();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Utc::now();

                // A new local day needs a new fetch window
                let today = local_date(viewer, now);
                if fetch.is_none() && viewer.loaded_on() != Some(today) {
                    debug!(%today, "Day changed, reloading");
                    let selection = viewer.selection().map(<[String]>::to_vec);
                    fetch = Some(start_fetch(viewer, selection, now));
                }

                let frame = viewer.tick(now);
                let mut out = std::io::stdout().lock();
                write!(out, "{}{}", CLEAR, frame.render(viewer.timezone()))?;
                for line in render_problems(viewer.aggregation()) {
                    write!(out, "\n{}", line)?;
                }
                let footer = match &fetch {
                    Some(fetch) => format!(
                        "Loading calendars {}%",
                        progress.percent_at(fetch.started.elapsed())
                    ),
                    None => "select <id,id…> | all | Ctrl-C to quit".to_string(),
                };
                write!(out, "\n\n{}\n", footer.dimmed())?;

                for signal in &frame.signals {
                    handle_signal(signal, config, &mut out);
                }
                out.flush()?;
            }
            result = poll_fetch(&mut fetch), if fetch.is_some() => {
                fetch = None;
                let loaded = result.map_err(with_reauth_hint)?;
                debug!(day = %loaded.day(), "Reload finished");
                viewer.apply(loaded);
                ticker.reset_immediately();
            }
            changed = selection_rx.changed(), if selection_open => {
                if changed.is_err() {
                    // stdin closed; keep ticking with the current selection
                    selection_open = false;
                    continue;
                }
                let selection = selection_rx.borrow_and_update().clone();
                let target = match &fetch {
                    Some(fetch) => fetch.selection.as_deref(),
                    None => viewer.selection(),
                };
                if selection.as_deref() == target {
                    debug!("Selection unchanged, keeping cached events");
                    continue;
                }
                // Replacing a running fetch drops it, which kills its provider process
                fetch = Some(start_fetch(viewer, selection, Utc::now()));
                ticker.reset_immediately();
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                return Ok(());
            }
        }
    }
}

fn start_fetch(viewer: &DayViewer, selection: Selection, now: DateTime<Utc>) -> Fetch {
    Fetch {
        load: viewer.fetch(selection.clone(), now),
        selection,
        started: Instant::now(),
    }
}

async fn poll_fetch(fetch: &mut Option<Fetch>) -> DaylineResult<Loaded> {
    match fetch {
        Some(fetch) => (&mut fetch.load).await,
        None => std::future::pending().await,
    }
}

fn local_date(viewer: &DayViewer, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(viewer.timezone()).date_naive()
}

fn handle_signal(signal: &Signal, config: &DaylineConfig, out: &mut impl Write) {
    match signal {
        Signal::Notify(event) if config.notify => {
            let result = notify_rust::Notification::new()
                .appname("dayline")
                .summary(&event.to_string())
                .body("Starts in less than a minute")
                .show()
                .map(|_| ());
            if let Err(e) = result {
                warn!(error = %e, "Failed to show notification");
            }
        }
        Signal::PlayCue(_) if config.cue => {
            if let Err(e) = write!(out, "{}", BELL) {
                warn!(error = %e, "Failed to ring bell");
            }
        }
        _ => {}
    }
}

/// Read selection commands on a plain thread.
///
/// A blocking stdin read can't be cancelled, so it must not live on the
/// runtime: the process exits on Ctrl-C without waiting for it.
fn spawn_selection_reader(tx: watch::Sender<Selection>) -> Result<()> {
    std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin");
                        return;
                    }
                };
                if let Some(selection) = parse_selection_command(&line) {
                    if tx.send(selection).is_err() {
                        return;
                    }
                }
            }
        })?;
    Ok(())
}

/// `all` selects every readable calendar; `select a,b` only the named ones.
/// Anything else is ignored.
fn parse_selection_command(line: &str) -> Option<Selection> {
    let line = line.trim();

    if line.eq_ignore_ascii_case("all") {
        return Some(None);
    }

    let ids = line.strip_prefix("select")?;
    if !ids.is_empty() && !ids.starts_with(char::is_whitespace) {
        return None;
    }

    Some(Some(
        ids.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dayline_core::day_stats::ActiveWindow;
    use dayline_core::remote::Provider;
    use dayline_core::viewer::Viewer;

    fn offline_viewer() -> DayViewer {
        Viewer::new(
            Provider::from_name("does-not-exist-anywhere"),
            chrono_tz::UTC,
            ActiveWindow::default(),
            None,
        )
    }

    #[tokio::test]
    async fn idle_fetch_slot_never_resolves() {
        let mut fetch = None;
        let polled = tokio::time::timeout(Duration::from_millis(20), poll_fetch(&mut fetch)).await;
        assert!(polled.is_err());
    }

    #[tokio::test]
    async fn fetch_result_applies_only_when_taken() {
        let mut viewer = offline_viewer();
        let mut fetch = Some(start_fetch(&viewer, Some(vec!["work".into()]), Utc::now()));

        // The view keeps ticking while the fetch is outstanding
        assert!(viewer.tick(Utc::now()).is_empty());
        assert!(viewer.selection().is_none());

        let loaded = poll_fetch(&mut fetch).await.unwrap();
        assert_eq!(loaded.selection(), Some(["work".to_string()].as_slice()));

        viewer.apply(loaded);
        assert_eq!(viewer.selection(), Some(["work".to_string()].as_slice()));
        assert_eq!(viewer.loaded_on(), Some(local_date(&viewer, Utc::now())));
    }

    #[test]
    fn selection_reader_returns_without_waiting_for_input() {
        let (tx, _rx) = watch::channel(None);
        assert!(spawn_selection_reader(tx).is_ok());
    }

    #[test]
    fn parses_selection_commands() {
        assert_eq!(parse_selection_command("all"), Some(None));
        assert_eq!(parse_selection_command("  ALL \n"), Some(None));
        assert_eq!(
            parse_selection_command("select primary, team@example.com"),
            Some(Some(vec!["primary".to_string(), "team@example.com".to_string()]))
        );
        assert_eq!(parse_selection_command("select"), Some(Some(Vec::new())));
    }

    #[test]
    fn ignores_other_input() {
        assert_eq!(parse_selection_command(""), None);
        assert_eq!(parse_selection_command("selection a"), None);
        assert_eq!(parse_selection_command("quit"), None);
    }
}
