//! Rank slots by the travel distance they add.
//!
//! The cost of a slot is a heuristic, not a route: the distance from the
//! event location to the neighbor before the slot plus the distance from the
//! event location to the neighbor after it. Slots without a neighbor on one
//! side fall back to a fixed term between the two reference locations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::distance::{DistanceMatrix, DistanceProvider, MatrixRequest, TravelMode, UnitSystem};
use crate::error::{PlannerError, Result};
use crate::locations::gather_locations;
use crate::model::{LocatedTimeSlot, TimeSlot};

/// What to do with a slot whose cost needed a distance the provider could not
/// supply (a non-OK matrix cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDistance {
    /// The missing term counts as 0 m and the slot is ranked normally.
    #[default]
    Zero,
    /// The missing term counts as 0 m, but the slot is ranked after every
    /// slot whose distances were all known.
    RankLast,
}

/// Lookup table for one matrix row: destination address → meters.
type DistanceRow<'a> = HashMap<&'a str, u64>;

/// Price each slot and return them in ascending order of added distance.
///
/// The provider is called exactly once (and not at all when `slots` is
/// empty) with `[event_location, start_location, ..neighbor locations]` as
/// both origins and destinations. Row 0 gives distances from the event
/// location, row 1 distances from the start location.
///
/// Per slot:
/// - with `comes_after`: event-row distance to its location; otherwise the
///   start-row distance to `event_location`.
/// - with `comes_before`: event-row distance to its location; otherwise the
///   event-row distance to `start_location`.
///
/// Neighbors with an empty location contribute 0. Ties keep the input order.
///
/// # Errors
///
/// Returns [`PlannerError::Provider`] if the provider call fails or the
/// matrix does not match the request's shape.
pub fn rank_by_distance<P>(
    slots: Vec<TimeSlot>,
    event_location: &str,
    start_location: &str,
    provider: &P,
    policy: MissingDistance,
) -> Result<Vec<LocatedTimeSlot>>
where
    P: DistanceProvider + ?Sized,
{
    if slots.is_empty() {
        return Ok(Vec::new());
    }

    let mut addresses = vec![event_location.to_string(), start_location.to_string()];
    addresses.extend(gather_locations(&slots));

    let request = MatrixRequest {
        origins: addresses.clone(),
        destinations: addresses.clone(),
        mode: TravelMode::Driving,
        units: UnitSystem::Imperial,
    };
    let matrix = provider.distance_matrix(&request)?;
    let n = addresses.len();
    if !matrix.has_shape(n, n) {
        return Err(PlannerError::Provider(format!(
            "expected a {n}x{n} distance matrix, got {} rows",
            matrix.rows.len()
        )));
    }

    let from_event = distance_row(&matrix, 0, &addresses);
    let from_start = distance_row(&matrix, 1, &addresses);

    let mut ranked: Vec<LocatedTimeSlot> = slots
        .into_iter()
        .map(|slot| {
            let after = match &slot.comes_after {
                Some(neighbor) => lookup(&from_event, &neighbor.location),
                None => lookup(&from_start, event_location),
            };
            let before = match &slot.comes_before {
                Some(neighbor) => lookup(&from_event, &neighbor.location),
                None => lookup(&from_event, start_location),
            };
            LocatedTimeSlot {
                slot,
                added_distance_meters: after.0.saturating_add(before.0),
                distance_known: after.1 && before.1,
            }
        })
        .collect();

    // sort_by_key is stable, so equal costs keep date/time order
    match policy {
        MissingDistance::Zero => ranked.sort_by_key(|s| s.added_distance_meters),
        MissingDistance::RankLast => {
            ranked.sort_by_key(|s| (!s.distance_known, s.added_distance_meters))
        }
    }
    Ok(ranked)
}

/// Build the lookup table for one origin row, dropping non-OK cells.
fn distance_row<'a>(
    matrix: &DistanceMatrix,
    origin: usize,
    addresses: &'a [String],
) -> DistanceRow<'a> {
    let mut row = DistanceRow::new();
    let Some(cells) = matrix.row(origin) else {
        return row;
    };
    for (destination, cell) in addresses.iter().zip(cells) {
        if cell.is_ok() {
            row.insert(destination.as_str(), cell.distance_meters);
        } else {
            tracing::warn!(
                origin = %addresses[origin],
                destination = %destination,
                status = %cell.status,
                "Distance unavailable"
            );
        }
    }
    row
}

/// `(meters, known)` for `location` in `row`.
fn lookup(row: &DistanceRow<'_>, location: &str) -> (u64, bool) {
    if location.is_empty() {
        return (0, true);
    }
    match row.get(location) {
        Some(&meters) => (meters, true),
        None => (0, false),
    }
}
