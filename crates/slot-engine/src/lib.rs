//! # slot-engine
//!
//! Find free time across calendars and rank it by travel.
//!
//! Given the events of one or more calendars, the engine finds every gap of
//! at least a requested length inside business hours on weekdays, then ranks
//! those gaps by how much extra driving they imply: a slot right after an
//! appointment near the event location is better than one that needs a trip
//! across town.
//!
//! ## Modules
//!
//! - [`model`] — `Date`, `Event`, `Schedule`, `Calendar`, `TimeSlot`
//! - [`aggregate`] — Flat event list → per-day ordered schedules
//! - [`slots`] — Free slots between events inside business hours
//! - [`locations`] — Distinct locations around candidate slots
//! - [`distance`] — Distance-provider trait and a table-backed provider
//! - [`rank`] — Added-distance cost and ranking
//! - [`recurrence`] — RRULE expansion of recurring events
//! - [`source`] — Event-source trait and a JSON calendar export reader
//! - [`query`] — Slot-search request and validation
//! - [`config`] — TOML configuration and engine options
//! - [`pipeline`] — The end-to-end search
//! - [`error`] — Error types

pub mod aggregate;
pub mod config;
pub mod distance;
pub mod error;
pub mod locations;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod rank;
pub mod recurrence;
pub mod slots;
pub mod source;

pub use aggregate::group_events_by_day;
pub use config::{BusinessHours, EngineOptions, PlannerConfig};
pub use distance::{
    DistanceCell, DistanceEntry, DistanceMatrix, DistanceProvider, MatrixRequest, TableProvider,
    TravelMode, UnitSystem,
};
pub use error::PlannerError;
pub use locations::gather_locations;
pub use model::{Calendar, Date, Event, LocatedTimeSlot, Neighbor, Schedule, TimeSlot};
pub use pipeline::plan_slots;
pub use query::SlotQuery;
pub use rank::{rank_by_distance, MissingDistance};
pub use slots::find_available_slots;
pub use source::{CalendarInfo, EventSource, JsonEventSource};
