//! A live day view over one provider.
//!
//! Owns the current selection, the last aggregation result and the clock. A
//! selection change re-aggregates and replaces the event list wholesale; ticks
//! between refreshes only re-derive from the cached events.
//!
//! Fetching is split from applying: [`Viewer::fetch`] returns a future that
//! borrows nothing from the viewer, so a caller can keep ticking on the cached
//! events and hand the result to [`Viewer::apply`] once it resolves.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tracing::debug;

use crate::aggregate::{Aggregation, Aggregator};
use crate::clock::{Frame, LiveClock};
use crate::day_stats::ActiveWindow;
use crate::error::DaylineResult;
use crate::event::NormalizedEvent;
use crate::source::{CalendarSource, CalendarSourceProvider};

/// A fetch in flight, detached from the viewer that started it.
pub type PendingLoad = LocalBoxFuture<'static, DaylineResult<Loaded>>;

/// A finished fetch, ready to replace a viewer's events.
#[derive(Debug, Clone)]
pub struct Loaded {
    selection: Option<Vec<String>>,
    day: NaiveDate,
    aggregation: Aggregation,
}

impl Loaded {
    pub fn selection(&self) -> Option<&[String]> {
        self.selection.as_deref()
    }

    /// Local date the fetch window covers.
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }
}

pub struct Viewer<P, Tz: TimeZone> {
    aggregator: Arc<Aggregator<P>>,
    tz: Tz,
    selection: Option<Vec<String>>,
    aggregation: Aggregation,
    loaded_on: Option<NaiveDate>,
    clock: LiveClock,
}

impl<P: CalendarSourceProvider, Tz: TimeZone> Viewer<P, Tz> {
    pub fn new(provider: P, tz: Tz, window: ActiveWindow, selection: Option<Vec<String>>) -> Self {
        Viewer {
            aggregator: Arc::new(Aggregator::new(provider)),
            tz,
            selection,
            aggregation: Aggregation::default(),
            loaded_on: None,
            clock: LiveClock::new(window),
        }
    }

    /// Start loading the events of `now`'s local day for `selection`.
    ///
    /// Nothing changes until the result is passed to [`Viewer::apply`].
    pub fn fetch(&self, selection: Option<Vec<String>>, now: DateTime<Utc>) -> PendingLoad
    where
        P: 'static,
        Tz: 'static,
    {
        let aggregator = Arc::clone(&self.aggregator);
        let local_now = now.with_timezone(&self.tz);

        async move {
            let aggregation = aggregator.load(selection.as_deref(), &local_now).await?;
            Ok(Loaded {
                selection,
                day: local_now.date_naive(),
                aggregation,
            })
        }
        .boxed_local()
    }

    /// Replace the selection and cached events with a finished fetch.
    ///
    /// Loading a different day than the one on screen starts a fresh clock, so
    /// a daily event notifies again on its next occurrence.
    pub fn apply(&mut self, loaded: Loaded) -> &Aggregation {
        if self.loaded_on.is_some_and(|day| day != loaded.day) {
            debug!(day = %loaded.day, "New day, resetting notifications and cues");
            self.clock = LiveClock::new(self.clock.window());
        }

        self.loaded_on = Some(loaded.day);
        self.selection = loaded.selection;
        self.aggregation = loaded.aggregation;
        &self.aggregation
    }

    /// Re-aggregate today's events with the current selection.
    pub async fn refresh(&mut self, now: DateTime<Utc>) -> DaylineResult<&Aggregation>
    where
        P: 'static,
        Tz: 'static,
    {
        let loaded = self.fetch(self.selection.clone(), now).await?;
        Ok(self.apply(loaded))
    }

    /// Change which sources participate. Returns whether anything was reloaded.
    pub async fn set_selection(
        &mut self,
        selection: Option<Vec<String>>,
        now: DateTime<Utc>,
    ) -> DaylineResult<bool>
    where
        P: 'static,
        Tz: 'static,
    {
        if selection == self.selection {
            debug!("Selection unchanged, keeping cached events");
            return Ok(false);
        }
        let loaded = self.fetch(selection, now).await?;
        self.apply(loaded);
        Ok(true)
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> Frame {
        let local_now = now.with_timezone(&self.tz);
        self.clock.tick(&local_now, &self.aggregation.events)
    }

    pub fn provider(&self) -> &P {
        self.aggregator.provider()
    }

    pub fn selection(&self) -> Option<&[String]> {
        self.selection.as_deref()
    }

    /// Local date of the last applied fetch, if any.
    pub fn loaded_on(&self) -> Option<NaiveDate> {
        self.loaded_on
    }

    pub fn sources(&self) -> &[CalendarSource] {
        &self.aggregation.sources
    }

    pub fn events(&self) -> &[NormalizedEvent] {
        &self.aggregation.events
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    pub fn window(&self) -> ActiveWindow {
        self.clock.window()
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }
}
