//! Calendar sources and the provider contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::ProviderError;
use crate::event::RawEvent;

/// What the signed-in account may do with a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessRole {
    Owner,
    Writer,
    Reader,
    FreeBusyReader,
    None,
    #[serde(other)]
    Unknown,
}

impl AccessRole {
    /// Only owner and reader sources contribute events to the timeline.
    pub fn contributes_events(self) -> bool {
        matches!(self, AccessRole::Owner | AccessRole::Reader)
    }
}

impl From<&str> for AccessRole {
    fn from(role: &str) -> Self {
        match role {
            "owner" => AccessRole::Owner,
            "writer" => AccessRole::Writer,
            "reader" => AccessRole::Reader,
            "freeBusyReader" => AccessRole::FreeBusyReader,
            "none" => AccessRole::None,
            _ => AccessRole::Unknown,
        }
    }
}

/// One external calendar feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSource {
    pub id: String,
    pub display_name: String,
    pub access_role: AccessRole,
    /// Upstream "shown in list" flag. Absent means selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl CalendarSource {
    pub fn is_selected_upstream(&self) -> bool {
        self.selected != Some(false)
    }
}

/// Anything that can list calendar sources and their events.
///
/// Implemented by the subprocess `remote::Provider` in production and by
/// in-memory fakes in tests.
#[async_trait]
pub trait CalendarSourceProvider: Send + Sync {
    async fn list_sources(&self) -> Result<Vec<CalendarSource>, ProviderError>;

    async fn list_events(
        &self,
        source_id: &str,
        window: &DateRange,
    ) -> Result<Vec<RawEvent>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_role_parses_google_names() {
        assert_eq!(AccessRole::from("freeBusyReader"), AccessRole::FreeBusyReader);
        assert_eq!(AccessRole::from("owner"), AccessRole::Owner);
        assert_eq!(AccessRole::from("something-new"), AccessRole::Unknown);
    }

    #[test]
    fn writer_does_not_contribute_events() {
        assert!(AccessRole::Owner.contributes_events());
        assert!(AccessRole::Reader.contributes_events());
        assert!(!AccessRole::Writer.contributes_events());
        assert!(!AccessRole::None.contributes_events());
    }

    #[test]
    fn missing_selected_flag_counts_as_selected() {
        let source: CalendarSource = serde_json::from_str(
            r#"{"id": "work", "display_name": "Work", "access_role": "owner"}"#,
        )
        .unwrap();
        assert!(source.is_selected_upstream());

        let hidden = CalendarSource {
            selected: Some(false),
            ..source
        };
        assert!(!hidden.is_selected_upstream());
    }
}
