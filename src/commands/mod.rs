pub mod calendars;
pub mod config;
pub mod select;
pub mod today;
pub mod watch;

use anyhow::Result;
use chrono::Utc;
use chrono_tz::Tz;
use dayline_core::error::DaylineError;
use dayline_core::remote::Provider;
use dayline_core::viewer::Viewer;

use crate::config::DaylineConfig;
use crate::utils::tui::with_progress;

pub type DayViewer = Viewer<Provider, Tz>;

/// Build a viewer from the config and load today's events.
pub async fn load_viewer(config: &DaylineConfig) -> Result<DayViewer> {
    let mut viewer = Viewer::new(
        config.provider()?,
        config.timezone()?,
        config.window()?,
        config.selected.clone(),
    );

    with_progress("Loading calendars", viewer.refresh(Utc::now()))
        .await
        .map_err(with_reauth_hint)?;

    Ok(viewer)
}

/// An expired session can't be fixed by retrying, so say what to do instead.
pub fn with_reauth_hint(err: DaylineError) -> anyhow::Error {
    match err {
        DaylineError::AuthExpired(msg) => anyhow::anyhow!(
            "Session expired: {}\n\n\
            Sign in again and replace the provider's session file, e.g.\n  \
            ~/.config/dayline/providers/google/session/<account>.toml",
            msg
        ),
        other => other.into(),
    }
}
