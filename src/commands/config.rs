use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::DaylineConfig;

pub fn run(config: &DaylineConfig) -> Result<()> {
    let config_path = DaylineConfig::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!(
        "  Providers:  {}",
        config_path
            .parent()
            .map(|p| p.join("providers"))
            .unwrap_or_default()
            .display()
    );

    println!();
    println!("{}", "Settings".bold());
    println!("  Provider:   dayline-provider-{}", config.provider);
    if let Some(account) = &config.account {
        println!("  Account:    {}", account);
    }
    println!("  Timezone:   {}", config.timezone()?.name());
    println!(
        "  Window:     {:02}:00 to {:02}:00",
        config.wake_hour, config.sleep_hour
    );
    println!("  Timeout:    {}", config.provider_timeout);
    match &config.selected {
        Some(ids) if ids.is_empty() => println!("  Calendars:  {}", "none".dimmed()),
        Some(ids) => println!("  Calendars:  {}", ids.join(", ")),
        None => println!("  Calendars:  all readable"),
    }

    Ok(())
}
