//! Core engine for dayline.
//!
//! This crate turns events from several calendar sources into one live view of
//! the current day:
//! - `normalize` converts provider-shaped events into `NormalizedEvent`s
//! - `aggregate` fetches from every participating source and merges the results
//! - `timeline` derives today's ordered schedule and `day_stats` the day progress
//! - `clock` re-derives live metrics on every tick and raises notification signals
//! - `remote` talks to provider binaries over the JSON protocol

pub mod aggregate;
pub mod clock;
pub mod date_range;
pub mod day;
pub mod day_stats;
pub mod error;
pub mod event;
pub mod normalize;
pub mod progress;
pub mod remote;
pub mod source;
pub mod timeline;
pub mod viewer;

pub use event::{NormalizedEvent, RawEvent};
pub use source::{AccessRole, CalendarSource, CalendarSourceProvider};
