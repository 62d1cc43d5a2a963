//! Source aggregation.
//!
//! Picks the participating sources, fetches their events concurrently, and
//! merges the normalized results into one list sorted by start. A failing
//! source or a malformed event only removes itself from the result.

use std::fmt;

use chrono::{DateTime, TimeZone};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::date_range::DateRange;
use crate::error::{DaylineError, DaylineResult, NormalizeError, ProviderError};
use crate::event::NormalizedEvent;
use crate::normalize::normalize;
use crate::source::{AccessRole, CalendarSource, CalendarSourceProvider};

/// Why a source was left out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoReadAccess(AccessRole),
    HiddenUpstream,
    NotSelected,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoReadAccess(role) => write!(f, "access role {role:?} cannot read events"),
            SkipReason::HiddenUpstream => write!(f, "not selected upstream"),
            SkipReason::NotSelected => write!(f, "not in selection"),
        }
    }
}

/// A source participates iff it is readable, not hidden upstream, and either
/// no selection is given or the selection contains it.
pub fn participation(
    source: &CalendarSource,
    selected: Option<&[String]>,
) -> Result<(), SkipReason> {
    if !source.access_role.contributes_events() {
        return Err(SkipReason::NoReadAccess(source.access_role));
    }
    if !source.is_selected_upstream() {
        return Err(SkipReason::HiddenUpstream);
    }
    if let Some(ids) = selected {
        if !ids.iter().any(|id| *id == source.id) {
            return Err(SkipReason::NotSelected);
        }
    }
    Ok(())
}

pub fn participating<'a>(
    sources: &'a [CalendarSource],
    selected: Option<&[String]>,
) -> Vec<&'a CalendarSource> {
    sources
        .iter()
        .filter(|source| match participation(source, selected) {
            Ok(()) => true,
            Err(reason) => {
                debug!(source_id = %source.id, %reason, "Skipping calendar");
                false
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source_id: String,
    pub error: ProviderError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub source_id: String,
    pub event_id: Option<String>,
    pub error: NormalizeError,
}

/// Result of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Every source the provider listed, participating or not.
    pub sources: Vec<CalendarSource>,
    /// Merged events, ascending by start.
    pub events: Vec<NormalizedEvent>,
    pub failures: Vec<SourceFailure>,
    pub rejections: Vec<Rejection>,
}

impl Aggregation {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct Aggregator<P> {
    provider: P,
}

impl<P: CalendarSourceProvider> Aggregator<P> {
    pub fn new(provider: P) -> Self {
        Aggregator { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// List sources, then aggregate today's events from the participating ones.
    ///
    /// An expired session on the source listing is returned as
    /// `DaylineError::AuthExpired`; every other failure degrades into the
    /// returned `Aggregation`.
    pub async fn load<Tz: TimeZone>(
        &self,
        selected: Option<&[String]>,
        now: &DateTime<Tz>,
    ) -> DaylineResult<Aggregation> {
        let sources = match self.provider.list_sources().await {
            Ok(sources) => sources,
            Err(ProviderError::AuthExpired(msg)) => return Err(DaylineError::AuthExpired(msg)),
            Err(ProviderError::Transient(msg)) => {
                warn!(error = %msg, "Failed to list calendars");
                return Ok(Aggregation::default());
            }
        };

        let window = DateRange::today(now);
        Ok(self
            .aggregate(sources, selected, &window, &now.timezone())
            .await)
    }

    /// Fetch every participating source concurrently and merge the results.
    pub async fn aggregate<Tz: TimeZone>(
        &self,
        sources: Vec<CalendarSource>,
        selected: Option<&[String]>,
        window: &DateRange,
        tz: &Tz,
    ) -> Aggregation {
        let targets = participating(&sources, selected);

        let fetches = targets.iter().map(|source| async move {
            let result = self.provider.list_events(&source.id, window).await;
            (*source, result)
        });
        let settled = join_all(fetches).await;

        let mut events = Vec::new();
        let mut failures = Vec::new();
        let mut rejections = Vec::new();

        for (source, result) in settled {
            let raw_events = match result {
                Ok(raw_events) => raw_events,
                Err(error) => {
                    warn!(source_id = %source.id, %error, "Failed to fetch events");
                    failures.push(SourceFailure {
                        source_id: source.id.clone(),
                        error,
                    });
                    continue;
                }
            };

            for raw in &raw_events {
                match normalize(raw, source, tz) {
                    Ok(event) => events.push(event),
                    Err(error) => {
                        warn!(
                            source_id = %source.id,
                            event_id = ?raw.id,
                            %error,
                            "Skipping malformed event"
                        );
                        rejections.push(Rejection {
                            source_id: source.id.clone(),
                            event_id: raw.id.clone(),
                            error,
                        });
                    }
                }
            }
        }

        // Stable: equal starts keep source order
        events.sort_by_key(|e| e.start);

        info!(
            sources = targets.len(),
            events = events.len(),
            failures = failures.len(),
            "Aggregated calendars"
        );

        Aggregation {
            sources,
            events,
            failures,
            rejections,
        }
    }
}
