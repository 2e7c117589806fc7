//! Find free slots between scheduled events.
//!
//! For every weekday in the requested range the business-hours envelope
//! `[morning cutoff, evening cutoff)` is walked against that day's schedule.
//! Each gap of at least the minimum duration becomes a [`TimeSlot`] that
//! remembers the event it follows and the event it precedes; those neighbors
//! are what the distance ranker later prices.

use chrono::{DateTime, Duration, Utc};

use crate::config::EngineOptions;
use crate::model::{Calendar, Date, Event, Schedule, TimeSlot};

/// Free slots of at least `min_duration` on each weekday in
/// `[start_date, end_date]`, in date order then time order.
///
/// # Neighbor rules
///
/// - A gap before an event has that event as `comes_before` and the previous
///   event with both timestamps as `comes_after`.
/// - The trailing gap of a day has the last schedule entry as `comes_after`,
///   even when that entry lacks an end time, and no `comes_before`.
/// - A date with no schedule yields one whole-envelope slot with no neighbors.
///
/// Events missing a start or end do not bound gaps, but they keep their place
/// in the schedule. Gaps are clamped to the envelope before being measured, so
/// every slot lies inside business hours. A gap exactly `min_duration` long
/// qualifies.
pub fn find_available_slots(
    calendar: &Calendar,
    start_date: Date,
    end_date: Date,
    min_duration: Duration,
    options: &EngineOptions,
) -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    let mut date = start_date;

    while date <= end_date {
        if date.is_weekend() {
            tracing::debug!(%date, "Skipping weekend");
        } else {
            slots_for_day(date, calendar.schedule(&date), min_duration, options, &mut slots);
        }
        date = date.add_days(1);
    }

    tracing::debug!(
        count = slots.len(),
        from = %start_date,
        to = %end_date,
        "Found available slots"
    );
    slots
}

fn slots_for_day(
    date: Date,
    schedule: Option<&Schedule>,
    min_duration: Duration,
    options: &EngineOptions,
    slots: &mut Vec<TimeSlot>,
) {
    let tz = &options.timezone;
    let (Some(day_start), Some(day_end)) = (
        date.at_hour(options.hours.morning_cutoff_hour, tz),
        date.at_hour(options.hours.evening_cutoff_hour, tz),
    ) else {
        tracing::warn!(%date, "Business hours do not exist in local time, skipping day");
        return;
    };

    let Some(schedule) = schedule else {
        if fits(day_start, day_end, min_duration) {
            slots.push(TimeSlot {
                date,
                start: day_start,
                end: day_end,
                comes_after: None,
                comes_before: None,
            });
        }
        return;
    };

    let mut last_end = day_start;
    let mut previous: Option<&Event> = None;

    for event in schedule.events() {
        let Some((start, end)) = event.interval() else {
            continue;
        };

        let gap_end = start.min(day_end);
        if fits(last_end, gap_end, min_duration) {
            slots.push(TimeSlot {
                date,
                start: last_end,
                end: gap_end,
                comes_after: previous.map(Event::neighbor),
                comes_before: Some(event.neighbor()),
            });
        }

        last_end = last_end.max(end);
        previous = Some(event);
    }

    if fits(last_end, day_end, min_duration) {
        slots.push(TimeSlot {
            date,
            start: last_end,
            end: day_end,
            comes_after: schedule.last().map(Event::neighbor),
            comes_before: None,
        });
    }
}

/// Non-empty and at least `min_duration` long.
fn fits(start: DateTime<Utc>, end: DateTime<Utc>, min_duration: Duration) -> bool {
    let gap = end - start;
    gap > Duration::zero() && gap >= min_duration
}
