//! Value types shared by every stage of the slot pipeline.
//!
//! Everything here is a plain owned value: created per invocation from
//! event-source data and never persisted. The only type that is mutated after
//! construction is [`Schedule`], which grows by ordered insertion while the
//! day aggregator runs.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;

// ── Date ────────────────────────────────────────────────────────────────────

/// A calendar day with no time-of-day component.
///
/// Ordering is lexicographic on (year, month, day). Day arithmetic is
/// delegated to [`chrono::NaiveDate`], so month and year rollover are handled
/// by the calendar library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Build a date from its parts, or `None` if the parts are not a real day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Date)
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Date(date)
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// The date `n` days later (or earlier, for negative `n`).
    pub fn add_days(self, n: i64) -> Self {
        Date(self.0 + Duration::days(n))
    }

    /// Saturday or Sunday.
    pub fn is_weekend(self) -> bool {
        matches!(self.0.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// The instant at `hour:00` local time in `tz`.
    ///
    /// Returns `None` when the wall-clock time does not exist in `tz` (a DST
    /// gap). For an ambiguous time the earlier instant is used.
    pub fn at_hour(self, hour: u32, tz: &Tz) -> Option<DateTime<Utc>> {
        let naive = self.0.and_hms_opt(hour, 0, 0)?;
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The instant of local midnight in `tz`.
    pub fn midnight(self, tz: &Tz) -> Option<DateTime<Utc>> {
        self.at_hour(0, tz)
    }

    /// The local calendar day that `timestamp` falls on in `tz`.
    pub fn from_timestamp(timestamp: DateTime<Utc>, tz: &Tz) -> Self {
        Date(timestamp.with_timezone(tz).date_naive())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for Date {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Date)
    }
}

// ── Event ───────────────────────────────────────────────────────────────────

/// A single (already expanded) calendar event.
///
/// An empty `location` means the event has no location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub summary: String,
    pub location: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Event {
    /// An event with both timestamps present.
    pub fn new(
        summary: impl Into<String>,
        location: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            summary: summary.into(),
            location: location.into(),
            start: Some(start),
            end: Some(end),
        }
    }

    /// `(start, end)` when both timestamps are present.
    pub fn interval(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.start?, self.end?))
    }

    pub fn has_location(&self) -> bool {
        !self.location.is_empty()
    }

    pub fn neighbor(&self) -> Neighbor {
        Neighbor {
            summary: self.summary.clone(),
            location: self.location.clone(),
        }
    }
}

/// The part of an event that a slot remembers about its neighbors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    pub summary: String,
    pub location: String,
}

// ── Schedule & Calendar ─────────────────────────────────────────────────────

/// The events of one date, ascending by start.
///
/// Events with equal starts keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    events: Vec<Event>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `event` at its sorted position.
    ///
    /// The position is found by binary search; equal starts are placed after
    /// the existing ones.
    pub fn insert(&mut self, event: Event) {
        let start = event.start;
        let index = self.events.partition_point(|e| e.start <= start);
        self.events.insert(index, event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Per-date schedules. Keys carry no order; use [`Calendar::sorted_dates`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    days: HashMap<Date, Schedule>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `event` into the schedule for `date`, creating it if needed.
    pub fn insert(&mut self, date: Date, event: Event) {
        self.days.entry(date).or_default().insert(event);
    }

    pub fn schedule(&self, date: &Date) -> Option<&Schedule> {
        self.days.get(date)
    }

    /// All dates that have a schedule, ascending.
    pub fn sorted_dates(&self) -> Vec<Date> {
        let mut dates: Vec<Date> = self.days.keys().copied().collect();
        dates.sort();
        dates
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

// ── Slots ───────────────────────────────────────────────────────────────────

/// A free interval on one date, with the events immediately around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub date: Date,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// The event the slot follows, if any.
    pub comes_after: Option<Neighbor>,
    /// The event the slot precedes, if any.
    pub comes_before: Option<Neighbor>,
}

impl TimeSlot {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// A [`TimeSlot`] with its ranking cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedTimeSlot {
    #[serde(flatten)]
    pub slot: TimeSlot,
    /// Sum of the neighbor (or fallback) distances, in meters.
    pub added_distance_meters: u64,
    /// False when at least one term came from a missing matrix cell.
    pub distance_known: bool,
}
