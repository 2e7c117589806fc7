//! End-to-end slot search: fetch, aggregate, find gaps, rank.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::aggregate::group_events_by_day;
use crate::config::EngineOptions;
use crate::distance::DistanceProvider;
use crate::error::{PlannerError, Result};
use crate::model::{Date, LocatedTimeSlot};
use crate::query::SlotQuery;
use crate::rank::rank_by_distance;
use crate::slots::find_available_slots;
use crate::source::EventSource;

/// Run a full slot search.
///
/// Searches `query.number_of_days` days starting at `first_day` (the caller
/// picks it; the library never reads the clock). Events are fetched from
/// every calendar in `query.calendar_ids` for the local-midnight window
/// covering those days.
///
/// # Errors
///
/// - [`PlannerError::InvalidQuery`] if the query is invalid or names a
///   calendar the source does not list; no events are fetched in that case.
/// - Whatever the event source or distance provider return for whole-call
///   failures.
pub fn plan_slots<S, P>(
    query: &SlotQuery,
    options: &EngineOptions,
    source: &S,
    provider: &P,
    first_day: Date,
) -> Result<Vec<LocatedTimeSlot>>
where
    S: EventSource + ?Sized,
    P: DistanceProvider + ?Sized,
{
    query.validate()?;
    check_calendars(query, source)?;

    let last_day = first_day.add_days(query.number_of_days - 1);
    let window_start = day_boundary(first_day, options)?;
    let window_end = day_boundary(last_day.add_days(1), options)?;

    let mut events = Vec::new();
    for calendar_id in &query.calendar_ids {
        events.extend(source.list_events(calendar_id, window_start, window_end)?);
    }
    tracing::info!(
        events = events.len(),
        calendars = query.calendar_ids.len(),
        from = %first_day,
        to = %last_day,
        "Fetched events"
    );

    let calendar = group_events_by_day(events, options);
    let slots = find_available_slots(
        &calendar,
        first_day,
        last_day,
        query.minimum_duration(),
        options,
    );

    let ranked = rank_by_distance(
        slots,
        &query.event_location,
        &query.start_location,
        provider,
        options.missing_distance,
    )?;
    tracing::info!(slots = ranked.len(), "Ranked slots");
    Ok(ranked)
}

/// Every requested calendar must be one the source lists.
fn check_calendars<S: EventSource + ?Sized>(query: &SlotQuery, source: &S) -> Result<()> {
    let known: HashSet<String> = source
        .list_calendars()?
        .into_iter()
        .map(|c| c.id)
        .collect();
    match query.calendar_ids.iter().find(|id| !known.contains(id.as_str())) {
        Some(id) => Err(PlannerError::InvalidQuery(format!("unknown calendar id '{id}'"))),
        None => Ok(()),
    }
}

/// Start of `date` in the configured zone.
///
/// Falls back to 01:00 for zones that skip midnight on DST days.
fn day_boundary(date: Date, options: &EngineOptions) -> Result<DateTime<Utc>> {
    let tz = &options.timezone;
    date.midnight(tz)
        .or_else(|| date.at_hour(1, tz))
        .ok_or_else(|| {
            PlannerError::InvalidQuery(format!("{date} has no start in {}", tz.name()))
        })
}
