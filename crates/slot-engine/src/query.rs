//! The caller's slot-search request.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Longest search window accepted, in days.
pub const MAX_DAYS_TO_SEARCH: i64 = 366;

/// Longest minimum slot length accepted, in minutes (one day).
pub const MAX_MINIMUM_DURATION_MINUTES: i64 = 24 * 60;

/// What to search for and where the traveller is going.
///
/// Fields default to empty/zero so a partially specified query can be loaded
/// from config and completed by the host; [`SlotQuery::validate`] rejects
/// anything still missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotQuery {
    /// How many consecutive days to search, starting at the first day.
    pub number_of_days: i64,
    /// Minimum slot length in minutes.
    pub minimum_duration_minutes: i64,
    /// Where the new event takes place.
    pub event_location: String,
    /// Where the traveller starts the day.
    pub start_location: String,
    /// Calendars whose events block time.
    pub calendar_ids: Vec<String>,
}

impl SlotQuery {
    /// The minimum slot length; saturates for values `validate` rejects.
    pub fn minimum_duration(&self) -> Duration {
        Duration::try_minutes(self.minimum_duration_minutes).unwrap_or(Duration::MAX)
    }

    /// Reject queries that cannot produce a meaningful search.
    pub fn validate(&self) -> Result<()> {
        if self.number_of_days <= 0 {
            return Err(invalid("number of days must be positive"));
        }
        if self.number_of_days > MAX_DAYS_TO_SEARCH {
            return Err(PlannerError::InvalidQuery(format!(
                "number of days must be at most {MAX_DAYS_TO_SEARCH}"
            )));
        }
        if self.minimum_duration_minutes <= 0 {
            return Err(invalid("minimum duration must be positive"));
        }
        if self.minimum_duration_minutes > MAX_MINIMUM_DURATION_MINUTES {
            return Err(PlannerError::InvalidQuery(format!(
                "minimum duration must be at most {MAX_MINIMUM_DURATION_MINUTES} minutes"
            )));
        }
        if self.event_location.trim().is_empty() {
            return Err(invalid("event location is empty"));
        }
        if self.start_location.trim().is_empty() {
            return Err(invalid("start location is empty"));
        }
        if self.calendar_ids.is_empty() {
            return Err(invalid("no calendars given"));
        }
        if self.calendar_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(invalid("calendar id is empty"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> PlannerError {
    PlannerError::InvalidQuery(msg.to_string())
}
