//! Group a flat list of events into per-day, time-ordered schedules.

use chrono::Timelike;

use crate::config::EngineOptions;
use crate::model::{Calendar, Date, Event};

/// Bucket `events` by their local start date.
///
/// Each event lands in the [`Schedule`](crate::model::Schedule) of the date its
/// start falls on in `options.timezone`, inserted at its sorted position so no
/// separate sort pass is needed. The result is independent of input order,
/// except that events with identical starts keep their relative order.
///
/// Events without a start are skipped with a warning. When
/// `options.include_out_of_hours_events` is false, events whose local start
/// hour is outside the business-hours envelope are dropped as well.
pub fn group_events_by_day<I>(events: I, options: &EngineOptions) -> Calendar
where
    I: IntoIterator<Item = Event>,
{
    let tz = &options.timezone;
    let mut calendar = Calendar::new();
    let mut skipped = 0usize;

    for event in events {
        let Some(start) = event.start else {
            tracing::warn!(summary = %event.summary, "Event has no start time, skipping");
            skipped += 1;
            continue;
        };

        let local = start.with_timezone(tz);
        if !options.include_out_of_hours_events && !options.hours.contains_hour(local.hour()) {
            tracing::debug!(
                summary = %event.summary,
                hour = local.hour(),
                "Event starts outside business hours, skipping"
            );
            skipped += 1;
            continue;
        }

        calendar.insert(Date::from_timestamp(start, tz), event);
    }

    tracing::debug!(days = calendar.len(), skipped, "Grouped events by day");
    calendar
}
