//! The event-source seam and a JSON-backed implementation.
//!
//! [`JsonEventSource`] reads an export shaped like the Google Calendar API:
//!
//! ```json
//! {
//!   "calendars": [
//!     {
//!       "id": "primary",
//!       "summary": "Work",
//!       "events": [
//!         {
//!           "summary": "Standup",
//!           "location": "Office",
//!           "start": { "dateTime": "2026-03-16T09:30:00-04:00" },
//!           "end": { "dateTime": "2026-03-16T09:45:00-04:00" },
//!           "recurrence": ["RRULE:FREQ=DAILY;COUNT=5"]
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Bad individual events never fail the load: `null` entries are dropped,
//! all-day (`date`-only) or unparseable times become missing timestamps, and
//! broken recurrence rules fall back to the single instance. Each of these is
//! logged.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::model::Event;
use crate::recurrence;

/// A calendar the source can list events from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInfo {
    pub id: String,
    pub summary: String,
}

/// Where events come from.
pub trait EventSource {
    fn list_calendars(&self) -> Result<Vec<CalendarInfo>>;

    /// Single (non-recurring) events of `calendar_id` that overlap
    /// `[window_start, window_end)`.
    ///
    /// Events lacking a start are passed through so the aggregator can report
    /// them.
    fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Event>>;
}

impl<S: EventSource + ?Sized> EventSource for &S {
    fn list_calendars(&self) -> Result<Vec<CalendarInfo>> {
        (**self).list_calendars()
    }

    fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        (**self).list_events(calendar_id, window_start, window_end)
    }
}

// ── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
struct CalendarExport {
    #[serde(default)]
    calendars: Vec<CalendarRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct CalendarRecord {
    id: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    events: Vec<Option<EventRecord>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EventRecord {
    summary: String,
    location: String,
    start: Option<EventTime>,
    end: Option<EventTime>,
    recurrence: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EventTime {
    date_time: Option<String>,
    date: Option<String>,
}

impl EventTime {
    fn instant(&self, summary: &str) -> Option<DateTime<Utc>> {
        let Some(raw) = self.date_time.as_deref() else {
            if self.date.is_some() {
                tracing::debug!(%summary, "All-day event has no time of day");
            }
            return None;
        };
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                tracing::warn!(%summary, value = %raw, error = %e, "Unable to parse event time");
                None
            }
        }
    }
}

impl EventRecord {
    /// Expand into the instances overlapping the window.
    fn instances(
        &self,
        tz: &Tz,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Vec<Event> {
        let base = Event {
            summary: self.summary.clone(),
            location: self.location.clone(),
            start: self.start.as_ref().and_then(|t| t.instant(&self.summary)),
            end: self.end.as_ref().and_then(|t| t.instant(&self.summary)),
        };

        let single = |event: Event| {
            if overlaps(&event, window_start, window_end) {
                vec![event]
            } else {
                Vec::new()
            }
        };

        let Some(start) = base.start else {
            return single(base);
        };
        if self.recurrence.is_empty() {
            return single(base);
        }

        // reach back far enough to catch an instance already in progress
        let span = base
            .end
            .map(|end| end - start)
            .unwrap_or_else(Duration::zero)
            .max(Duration::zero());
        let from = window_start - span;

        match recurrence::expand_starts(start, &self.recurrence, tz, from, window_end) {
            Ok(starts) => starts
                .into_iter()
                .map(|s| Event {
                    start: Some(s),
                    end: base.end.map(|_| s + span),
                    ..base.clone()
                })
                .filter(|e| overlaps(e, window_start, window_end))
                .collect(),
            Err(e) => {
                tracing::warn!(summary = %self.summary, error = %e, "Ignoring recurrence");
                single(base)
            }
        }
    }
}

fn overlaps(event: &Event, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> bool {
    match (event.start, event.end) {
        (Some(start), Some(end)) => end > window_start && start < window_end,
        (Some(start), None) => start >= window_start && start < window_end,
        (None, _) => true,
    }
}

// ── JsonEventSource ─────────────────────────────────────────────────────────

/// An [`EventSource`] over a JSON calendar export.
#[derive(Debug, Clone)]
pub struct JsonEventSource {
    calendars: Vec<CalendarRecord>,
    timezone: Tz,
}

impl JsonEventSource {
    /// Parse an export. `timezone` anchors recurrence expansion.
    pub fn from_json_str(json: &str, timezone: Tz) -> Result<Self> {
        let export: CalendarExport = serde_json::from_str(json)
            .map_err(|e| PlannerError::EventSource(format!("invalid calendar export: {e}")))?;
        Ok(Self {
            calendars: export.calendars,
            timezone,
        })
    }

    pub fn from_file(path: impl AsRef<Path>, timezone: Tz) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlannerError::EventSource(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content, timezone)
    }
}

impl EventSource for JsonEventSource {
    fn list_calendars(&self) -> Result<Vec<CalendarInfo>> {
        Ok(self
            .calendars
            .iter()
            .map(|c| CalendarInfo {
                id: c.id.clone(),
                summary: c.summary.clone(),
            })
            .collect())
    }

    fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let calendar = self
            .calendars
            .iter()
            .find(|c| c.id == calendar_id)
            .ok_or_else(|| {
                PlannerError::InvalidQuery(format!("unknown calendar id '{calendar_id}'"))
            })?;

        let mut events = Vec::new();
        for record in &calendar.events {
            let Some(record) = record else {
                tracing::warn!(calendar = %calendar_id, "Null event in export, skipping");
                continue;
            };
            events.extend(record.instances(&self.timezone, window_start, window_end));
        }
        tracing::debug!(calendar = %calendar_id, count = events.len(), "Listed events");
        Ok(events)
    }
}
