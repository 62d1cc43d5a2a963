//! Google Calendar API v3 response shapes, reduced to the fields dayline reads.

use dayline_core::{AccessRole, CalendarSource, RawEvent};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListPage {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    pub id: String,
    pub summary: Option<String>,
    pub summary_override: Option<String>,
    pub access_role: Option<String>,
    pub selected: Option<bool>,
}

impl From<CalendarListEntry> for CalendarSource {
    fn from(entry: CalendarListEntry) -> Self {
        let display_name = entry
            .summary_override
            .or(entry.summary)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| entry.id.clone());

        CalendarSource {
            access_role: entry
                .access_role
                .as_deref()
                .map(AccessRole::from)
                .unwrap_or(AccessRole::Unknown),
            id: entry.id,
            display_name,
            selected: entry.selected,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<RawEvent>,
    pub next_page_token: Option<String>,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorItem {
    #[serde(default)]
    pub reason: String,
}

impl ErrorBody {
    pub fn reasons(&self) -> impl Iterator<Item = &str> {
        self.error.errors.iter().map(|item| item.reason.as_str())
    }
}
