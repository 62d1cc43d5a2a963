//! dayline configuration at `<config_dir>/dayline/config.toml`, overridable
//! with `DAYLINE_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use dayline_core::day_stats::ActiveWindow;
use dayline_core::remote::Provider;
use serde::Deserialize;
use tracing::warn;

const DEFAULT_PROVIDER: &str = "google";
const DEFAULT_PROVIDER_TIMEOUT: &str = "10s";

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_wake_hour() -> u32 {
    7
}

fn default_sleep_hour() -> u32 {
    23
}

fn default_provider_timeout() -> String {
    DEFAULT_PROVIDER_TIMEOUT.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaylineConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    pub account: Option<String>,

    /// Source ids to show. Absent means every readable source.
    pub selected: Option<Vec<String>>,

    #[serde(default = "default_wake_hour")]
    pub wake_hour: u32,

    #[serde(default = "default_sleep_hour")]
    pub sleep_hour: u32,

    /// IANA name, e.g. "Europe/Berlin". Defaults to the system timezone.
    pub timezone: Option<String>,

    #[serde(default = "default_provider_timeout")]
    pub provider_timeout: String,

    #[serde(default = "default_true")]
    pub notify: bool,

    #[serde(default = "default_true")]
    pub cue: bool,
}

impl DaylineConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("dayline");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("DAYLINE")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("selected"),
            )
            .build()
            .and_then(|config| config.try_deserialize())
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn window(&self) -> Result<ActiveWindow> {
        Ok(ActiveWindow::new(self.wake_hour, self.sleep_hour)?)
    }

    pub fn provider_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.provider_timeout)
            .with_context(|| format!("Invalid provider_timeout '{}'", self.provider_timeout))
    }

    /// The configured timezone, or the system's when unset or unknown.
    pub fn timezone(&self) -> Result<Tz> {
        if let Some(name) = &self.timezone {
            return name
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", name, e));
        }

        Ok(system_timezone())
    }

    pub fn provider(&self) -> Result<Provider> {
        Ok(Provider::from_name(&self.provider)
            .with_account(self.account.clone())
            .with_timeout(self.provider_timeout()?))
    }
}

fn system_timezone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(timezone = %name, "Unknown system timezone, using UTC");
            Tz::UTC
        }),
        Err(e) => {
            warn!(error = %e, "Could not determine system timezone, using UTC");
            Tz::UTC
        }
    }
}

/// Persist the source selection, keeping every other line as it is.
/// `None` removes the key, which selects every readable source.
///
/// Only the `selected` assignment is rewritten, so the commented defaults
/// from `create_default_config` survive.
pub fn save_selection(path: &Path, selected: Option<&[String]>) -> Result<()> {
    let contents = if path.exists() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?
    } else {
        String::new()
    };

    // Never write over a file we can't make sense of
    toml::from_str::<toml::Table>(&contents)
        .with_context(|| format!("Could not parse {}", path.display()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }

    let contents = with_selection(&contents, selected);
    std::fs::write(path, contents).with_context(|| format!("Could not write {}", path.display()))?;

    Ok(())
}

/// Replace the top-level `selected` assignment in `contents`.
///
/// The new line goes where the old one was, else right under a commented
/// `# selected = ...` example, else before the first table header.
fn with_selection(contents: &str, selected: Option<&[String]>) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut existing = None;
    let mut example = None;
    let mut first_table = None;
    let mut in_old_array = false;

    for line in contents.lines() {
        let trimmed = line.trim_start();

        if in_old_array {
            in_old_array = !trimmed.contains(']');
            continue;
        }
        if first_table.is_none() && trimmed.starts_with('[') {
            first_table = Some(lines.len());
        }

        if first_table.is_none() {
            if assigns_selected(trimmed) {
                existing.get_or_insert(lines.len());
                in_old_array = !trimmed.contains(']');
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix('#') {
                if example.is_none() && assigns_selected(comment.trim_start()) {
                    example = Some(lines.len() + 1);
                }
            }
        }

        lines.push(line);
    }

    let assignment = selected.map(|ids| {
        let ids = ids.iter().cloned().map(toml::Value::String).collect();
        format!("selected = {}", toml::Value::Array(ids))
    });
    if let Some(assignment) = &assignment {
        let at = existing.or(example).or(first_table).unwrap_or(lines.len());
        lines.insert(at, assignment);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn assigns_selected(line: &str) -> bool {
    line.strip_prefix("selected")
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

/// Create a default config file with all options commented out.
pub fn create_default_config(path: &Path) -> Result<()> {
    let contents = format!(
        "\
# dayline configuration

# Provider binary to use (dayline-provider-<name> on your PATH):
# provider = \"{DEFAULT_PROVIDER}\"

# Account whose session the provider should use:
# account = \"me@example.com\"

# Calendars to show, by id. Leave unset to show every readable calendar.
# Change it with `dayline select`.
# selected = [\"primary\"]

# Active window, as hours of the day:
# wake_hour = 7
# sleep_hour = 23

# IANA timezone, defaults to the system timezone:
# timezone = \"Europe/Berlin\"

# How long to wait for a single provider call:
# provider_timeout = \"{DEFAULT_PROVIDER_TIMEOUT}\"

# Desktop notification a minute before an event starts:
# notify = true

# Terminal bell five seconds before the current event ends:
# cue = true
"
    );

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create config directory {}", parent.display()))?;
    }

    std::fs::write(path, contents)
        .with_context(|| format!("Could not write config file {}", path.display()))?;

    Ok(())
}
