use anyhow::Result;
use chrono::Utc;

use crate::commands::load_viewer;
use crate::config::DaylineConfig;
use crate::render::{Render, render_problems};

pub async fn run(config: &DaylineConfig, json: bool) -> Result<()> {
    let mut viewer = load_viewer(config).await?;
    let frame = viewer.tick(Utc::now());

    if json {
        let view = serde_json::json!({
            "now": frame.now,
            "timezone": viewer.timezone().name(),
            "items": frame.entries,
            "stats": frame.stats,
        });
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", frame.render(viewer.timezone()));

    let problems = render_problems(viewer.aggregation());
    if !problems.is_empty() {
        println!();
        for line in problems {
            println!("{}", line);
        }
    }

    Ok(())
}
