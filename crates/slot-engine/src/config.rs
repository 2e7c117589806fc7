//! Engine configuration.
//!
//! [`PlannerConfig`] is the on-disk TOML form; every field has a default so an
//! empty file is valid. [`PlannerConfig::engine_options`] validates it and
//! produces the [`EngineOptions`] the pipeline stages take.

use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::query::SlotQuery;
use crate::rank::MissingDistance;

/// Default business-hours start (local hour).
pub const DEFAULT_MORNING_CUTOFF_HOUR: u32 = 9;
/// Default business-hours end (local hour).
pub const DEFAULT_EVENING_CUTOFF_HOUR: u32 = 17;

/// The daily `[morning, evening)` window, in local hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub morning_cutoff_hour: u32,
    pub evening_cutoff_hour: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            morning_cutoff_hour: DEFAULT_MORNING_CUTOFF_HOUR,
            evening_cutoff_hour: DEFAULT_EVENING_CUTOFF_HOUR,
        }
    }
}

impl BusinessHours {
    /// Whether a local start hour falls inside the envelope.
    pub fn contains_hour(&self, hour: u32) -> bool {
        hour >= self.morning_cutoff_hour && hour < self.evening_cutoff_hour
    }

    fn validate(&self) -> Result<()> {
        if self.morning_cutoff_hour > 23 || self.evening_cutoff_hour > 23 {
            return Err(PlannerError::InvalidConfig(format!(
                "cutoff hours must be between 0 and 23, got {}..{}",
                self.morning_cutoff_hour, self.evening_cutoff_hour
            )));
        }
        if self.morning_cutoff_hour >= self.evening_cutoff_hour {
            return Err(PlannerError::InvalidConfig(format!(
                "morning cutoff ({}) must be before evening cutoff ({})",
                self.morning_cutoff_hour, self.evening_cutoff_hour
            )));
        }
        Ok(())
    }
}

/// Validated options shared by the pipeline stages.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Zone used for day bucketing and business-hours comparison.
    pub timezone: Tz,
    pub hours: BusinessHours,
    /// When false, events starting outside business hours are dropped during
    /// aggregation.
    pub include_out_of_hours_events: bool,
    pub missing_distance: MissingDistance,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            hours: BusinessHours::default(),
            include_out_of_hours_events: true,
            missing_distance: MissingDistance::default(),
        }
    }
}

/// Configuration file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// IANA zone name, e.g. `"America/New_York"`.
    pub timezone: String,
    pub morning_cutoff_hour: u32,
    pub evening_cutoff_hour: u32,
    pub include_out_of_hours_events: bool,
    pub missing_distance: MissingDistance,
    /// Query defaults; hosts may override individual fields.
    pub query: SlotQuery,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            morning_cutoff_hour: DEFAULT_MORNING_CUTOFF_HOUR,
            evening_cutoff_hour: DEFAULT_EVENING_CUTOFF_HOUR,
            include_out_of_hours_events: true,
            missing_distance: MissingDistance::default(),
            query: SlotQuery::default(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PlannerError::ReadConfig)?;
        tracing::debug!("Loaded config from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn business_hours(&self) -> BusinessHours {
        BusinessHours {
            morning_cutoff_hour: self.morning_cutoff_hour,
            evening_cutoff_hour: self.evening_cutoff_hour,
        }
    }

    /// Validate the configuration.
    ///
    /// The query section is not checked here; it is validated when a query is
    /// actually run, after host overrides are applied.
    pub fn validate(&self) -> Result<()> {
        self.engine_options().map(|_| ())
    }

    /// Convert into validated [`EngineOptions`].
    pub fn engine_options(&self) -> Result<EngineOptions> {
        let timezone = parse_timezone(&self.timezone)?;
        let hours = self.business_hours();
        hours.validate()?;
        Ok(EngineOptions {
            timezone,
            hours,
            include_out_of_hours_events: self.include_out_of_hours_events,
            missing_distance: self.missing_distance,
        })
    }
}

/// Parse an IANA timezone string into `Tz`.
fn parse_timezone(s: &str) -> Result<Tz> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| PlannerError::InvalidConfig(format!("unknown timezone '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        let options = config.engine_options().unwrap();
        assert_eq!(options, EngineOptions::default());
        assert_eq!(options.hours.morning_cutoff_hour, 9);
        assert_eq!(options.hours.evening_cutoff_hour, 17);
        assert!(options.include_out_of_hours_events);
        assert_eq!(options.missing_distance, MissingDistance::Zero);
    }

    #[test]
    fn test_full_config_parses() {
        let config = PlannerConfig::from_toml_str(
            r#"
            timezone = "America/New_York"
            morning_cutoff_hour = 8
            evening_cutoff_hour = 18
            include_out_of_hours_events = false
            missing_distance = "rank_last"

            [query]
            number_of_days = 5
            minimum_duration_minutes = 90
            event_location = "Library"
            start_location = "Home"
            calendar_ids = ["work", "personal"]
            "#,
        )
        .unwrap();

        let options = config.engine_options().unwrap();
        assert_eq!(options.timezone, chrono_tz::America::New_York);
        assert_eq!(options.hours.morning_cutoff_hour, 8);
        assert!(!options.include_out_of_hours_events);
        assert_eq!(options.missing_distance, MissingDistance::RankLast);
        assert_eq!(config.query.number_of_days, 5);
        assert_eq!(config.query.calendar_ids, vec!["work", "personal"]);
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let err = PlannerConfig::from_toml_str(r#"timezone = "Mars/Olympus""#).unwrap_err();
        assert!(err.to_string().contains("unknown timezone"), "got: {err}");
        assert!(err.is_validation());
    }

    #[test]
    fn test_inverted_hours_rejected() {
        let err = PlannerConfig::from_toml_str(
            "morning_cutoff_hour = 17\nevening_cutoff_hour = 9",
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be before"), "got: {err}");
    }

    #[test]
    fn test_out_of_range_hour_rejected() {
        let err = PlannerConfig::from_toml_str("evening_cutoff_hour = 24").unwrap_err();
        assert!(err.to_string().contains("between 0 and 23"), "got: {err}");
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = PlannerConfig::from_toml_str("timezone = ").unwrap_err();
        assert!(matches!(err, PlannerError::ParseConfig(_)));
    }

    #[test]
    fn test_business_hours_contains_hour() {
        let hours = BusinessHours::default();
        assert!(!hours.contains_hour(8));
        assert!(hours.contains_hour(9));
        assert!(hours.contains_hour(16));
        assert!(!hours.contains_hour(17));
    }
}
