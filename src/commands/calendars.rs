use anyhow::Result;
use dayline_core::aggregate::{SkipReason, participation};
use dayline_core::error::DaylineError;
use dayline_core::source::CalendarSourceProvider;
use owo_colors::OwoColorize;

use crate::commands::with_reauth_hint;
use crate::config::DaylineConfig;
use crate::utils::tui::create_spinner;

pub async fn run(config: &DaylineConfig) -> Result<()> {
    let provider = config.provider()?;

    let spinner = create_spinner("Listing calendars".to_string());
    let result = provider.list_sources().await;
    spinner.finish_and_clear();

    let sources = result.map_err(|e| with_reauth_hint(DaylineError::from(e)))?;

    if sources.is_empty() {
        println!("{}", "No calendars found".dimmed());
        return Ok(());
    }

    let selected = config.selected.as_deref();
    for source in &sources {
        let (marker, note) = match participation(source, selected) {
            Ok(()) => ("●".green().to_string(), String::new()),
            Err(reason @ SkipReason::NotSelected) => ("○".to_string(), reason.to_string()),
            Err(reason) => ("×".dimmed().to_string(), reason.to_string()),
        };

        println!(
            "{} {} {}",
            marker,
            source.display_name.bold(),
            format!("{} {}", source.id, note).dimmed()
        );
    }

    Ok(())
}
