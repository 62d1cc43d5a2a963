use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::{DaylineConfig, save_selection};

pub fn run(ids: Vec<String>, all: bool) -> Result<()> {
    let path = DaylineConfig::config_path()?;

    if all {
        save_selection(&path, None)?;
        println!("Showing {} readable calendars", "all".bold());
        return Ok(());
    }

    if ids.is_empty() {
        anyhow::bail!("Name at least one calendar id, or pass --all");
    }

    save_selection(&path, Some(ids.as_slice()))?;
    println!("Showing {}", ids.join(", ").bold());
    println!("{}", "Run `dayline calendars` to see the available ids".dimmed());

    Ok(())
}
