//! The distance-provider seam.
//!
//! The ranker asks a [`DistanceProvider`] for one origin × destination matrix
//! per invocation. Real hosts back this with a distance-matrix web service;
//! [`TableProvider`] answers from a pairwise table loaded from JSON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Cell status meaning the distance is valid.
pub const STATUS_OK: &str = "OK";
/// Cell status used when no route between the two addresses is known.
pub const STATUS_NOT_FOUND: &str = "NOT_FOUND";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
    Transit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

/// A full matrix request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRequest {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub mode: TravelMode,
    /// Display units only; distances always come back in meters.
    pub units: UnitSystem,
}

/// One origin → destination result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceCell {
    pub distance_meters: u64,
    pub status: String,
}

impl DistanceCell {
    pub fn ok(distance_meters: u64) -> Self {
        Self {
            distance_meters,
            status: STATUS_OK.to_string(),
        }
    }

    /// A cell carrying a non-OK status and no usable distance.
    pub fn failed(status: impl Into<String>) -> Self {
        Self {
            distance_meters: 0,
            status: status.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Cells indexed `[origin][destination]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    pub rows: Vec<Vec<DistanceCell>>,
}

impl DistanceMatrix {
    pub fn row(&self, origin: usize) -> Option<&[DistanceCell]> {
        self.rows.get(origin).map(Vec::as_slice)
    }

    /// Whether the matrix has exactly `origins` rows of `destinations` cells.
    pub fn has_shape(&self, origins: usize, destinations: usize) -> bool {
        self.rows.len() == origins && self.rows.iter().all(|r| r.len() == destinations)
    }
}

/// Point-to-point distance lookup.
///
/// A returned `Err` is a whole-call failure; per-pair problems are reported
/// through cell statuses instead.
pub trait DistanceProvider {
    fn distance_matrix(&self, request: &MatrixRequest) -> Result<DistanceMatrix>;
}

impl<P: DistanceProvider + ?Sized> DistanceProvider for &P {
    fn distance_matrix(&self, request: &MatrixRequest) -> Result<DistanceMatrix> {
        (**self).distance_matrix(request)
    }
}

// ── TableProvider ───────────────────────────────────────────────────────────

/// One row of a pairwise distance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceEntry {
    pub from: String,
    pub to: String,
    pub meters: u64,
}

/// A provider backed by a fixed table of pairwise distances.
///
/// Lookups try `(origin, destination)` first and then the reverse pair, so a
/// table only needs one direction per pair. An address is always 0 m from
/// itself. Unknown pairs yield a [`STATUS_NOT_FOUND`] cell.
#[derive(Debug, Clone, Default)]
pub struct TableProvider {
    distances: HashMap<(String, String), u64>,
}

impl TableProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>, meters: u64) {
        self.distances.insert((from.into(), to.into()), meters);
    }

    /// Builder-style [`TableProvider::insert`].
    pub fn with(mut self, from: impl Into<String>, to: impl Into<String>, meters: u64) -> Self {
        self.insert(from, to, meters);
        self
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = DistanceEntry>,
    {
        let mut table = Self::new();
        for entry in entries {
            table.insert(entry.from, entry.to, entry.meters);
        }
        table
    }

    /// Load a JSON array of `{"from", "to", "meters"}` objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<DistanceEntry> = serde_json::from_str(json)
            .map_err(|e| PlannerError::Provider(format!("invalid distance table: {e}")))?;
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    fn lookup(&self, origin: &str, destination: &str) -> DistanceCell {
        if origin == destination {
            return DistanceCell::ok(0);
        }
        let forward = (origin.to_string(), destination.to_string());
        let reverse = (destination.to_string(), origin.to_string());
        self.distances
            .get(&forward)
            .or_else(|| self.distances.get(&reverse))
            .map(|&m| DistanceCell::ok(m))
            .unwrap_or_else(|| DistanceCell::failed(STATUS_NOT_FOUND))
    }
}

impl DistanceProvider for TableProvider {
    fn distance_matrix(&self, request: &MatrixRequest) -> Result<DistanceMatrix> {
        let rows = request
            .origins
            .iter()
            .map(|origin| {
                request
                    .destinations
                    .iter()
                    .map(|destination| self.lookup(origin, destination))
                    .collect()
            })
            .collect();
        Ok(DistanceMatrix { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(addresses: &[&str]) -> MatrixRequest {
        let list: Vec<String> = addresses.iter().map(|s| s.to_string()).collect();
        MatrixRequest {
            origins: list.clone(),
            destinations: list,
            mode: TravelMode::Driving,
            units: UnitSystem::Imperial,
        }
    }

    #[test]
    fn test_table_provider_full_matrix() {
        let provider = TableProvider::new().with("Home", "Gym", 800).with("Gym", "Office", 300);
        let matrix = provider
            .distance_matrix(&request(&["Home", "Gym", "Office"]))
            .unwrap();

        assert!(matrix.has_shape(3, 3));
        assert_eq!(matrix.rows[0][0], DistanceCell::ok(0));
        assert_eq!(matrix.rows[0][1], DistanceCell::ok(800));
        // reverse direction falls back to the stored pair
        assert_eq!(matrix.rows[1][0], DistanceCell::ok(800));
        assert_eq!(matrix.rows[2][1], DistanceCell::ok(300));
        let missing = &matrix.rows[0][2];
        assert!(!missing.is_ok());
        assert_eq!(missing.status, STATUS_NOT_FOUND);
    }

    #[test]
    fn test_forward_entry_wins_over_reverse() {
        let provider = TableProvider::new().with("A", "B", 100).with("B", "A", 120);
        let matrix = provider.distance_matrix(&request(&["A", "B"])).unwrap();
        assert_eq!(matrix.rows[0][1].distance_meters, 100);
        assert_eq!(matrix.rows[1][0].distance_meters, 120);
    }

    #[test]
    fn test_from_json_str() {
        let provider = TableProvider::from_json_str(
            r#"[{"from": "Home", "to": "Library", "meters": 4200}]"#,
        )
        .unwrap();
        assert_eq!(provider.len(), 1);
        let matrix = provider.distance_matrix(&request(&["Library", "Home"])).unwrap();
        assert_eq!(matrix.rows[0][1].distance_meters, 4200);
    }

    #[test]
    fn test_from_json_str_rejects_bad_input() {
        let err = TableProvider::from_json_str(r#"{"from": "Home"}"#).unwrap_err();
        assert!(matches!(err, PlannerError::Provider(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_has_shape_detects_ragged_rows() {
        let matrix = DistanceMatrix {
            rows: vec![vec![DistanceCell::ok(0), DistanceCell::ok(1)], vec![DistanceCell::ok(1)]],
        };
        assert!(!matrix.has_shape(2, 2));
        assert!(matrix.row(1).is_some());
        assert!(matrix.row(2).is_none());
    }
}
