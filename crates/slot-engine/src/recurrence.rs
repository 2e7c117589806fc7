//! Expand recurring events into single instances.
//!
//! Calendar exports carry recurring events once, with iCalendar recurrence
//! lines (`RRULE:`, `EXDATE:`, `RDATE:`). The slot search needs concrete
//! instances, so each rule set is expanded inside the search window. DTSTART
//! is the event's start in the engine's zone, so weekly events keep their
//! wall-clock time across DST changes.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::error::{PlannerError, Result};

/// Upper bound on instances produced per event.
pub const MAX_INSTANCES: u16 = 500;

/// Occurrence starts of a recurring event inside `[window_start, window_end)`.
///
/// `rules` are the raw recurrence lines; blank lines are ignored.
///
/// # Errors
///
/// Returns [`PlannerError::InvalidRecurrence`] if the rule set cannot be
/// parsed.
pub fn expand_starts(
    start: DateTime<Utc>,
    rules: &[String],
    tz: &Tz,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>> {
    let local = start.with_timezone(tz);
    let mut text = format!(
        "DTSTART;TZID={}:{}",
        tz.name(),
        local.format("%Y%m%dT%H%M%S")
    );
    for line in rules.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        text.push('\n');
        text.push_str(line);
    }

    let set: RRuleSet = text
        .parse()
        .map_err(|e| PlannerError::InvalidRecurrence(format!("{e}")))?;

    let result = set
        .after(window_start.with_timezone(&rrule::Tz::UTC))
        .before(window_end.with_timezone(&rrule::Tz::UTC))
        .all(MAX_INSTANCES);
    if result.limited {
        tracing::warn!(
            limit = MAX_INSTANCES,
            "Recurrence produced too many instances, truncating"
        );
    }

    Ok(result
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc))
        .filter(|dt| *dt >= window_start && *dt < window_end)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, mo, d, h, 0, 0).unwrap()
    }

    fn rules(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_daily_count() {
        let starts = expand_starts(
            utc(3, 16, 10),
            &rules(&["RRULE:FREQ=DAILY;COUNT=3"]),
            &Tz::UTC,
            utc(3, 1, 0),
            utc(4, 1, 0),
        )
        .unwrap();
        assert_eq!(starts, vec![utc(3, 16, 10), utc(3, 17, 10), utc(3, 18, 10)]);
    }

    #[test]
    fn test_window_clips_instances() {
        let starts = expand_starts(
            utc(3, 2, 10),
            &rules(&["RRULE:FREQ=WEEKLY"]),
            &Tz::UTC,
            utc(3, 16, 0),
            utc(3, 30, 0),
        )
        .unwrap();
        assert_eq!(starts, vec![utc(3, 16, 10), utc(3, 23, 10)]);
    }

    #[test]
    fn test_weekly_keeps_local_wall_clock_across_dst() {
        let tz = chrono_tz::America::New_York;
        // Monday 2026-03-02 10:00 EST = 15:00 UTC; DST starts 2026-03-08
        let starts = expand_starts(
            utc(3, 2, 15),
            &rules(&["RRULE:FREQ=WEEKLY;COUNT=2"]),
            &tz,
            utc(3, 1, 0),
            utc(4, 1, 0),
        )
        .unwrap();
        // the second instance is 10:00 EDT = 14:00 UTC
        assert_eq!(starts, vec![utc(3, 2, 15), utc(3, 9, 14)]);
    }

    #[test]
    fn test_blank_lines_ignored() {
        let starts = expand_starts(
            utc(3, 16, 10),
            &rules(&["", "RRULE:FREQ=DAILY;COUNT=2", "  "]),
            &Tz::UTC,
            utc(3, 1, 0),
            utc(4, 1, 0),
        )
        .unwrap();
        assert_eq!(starts.len(), 2);
    }

    #[test]
    fn test_invalid_rule_is_error() {
        let err = expand_starts(
            utc(3, 16, 10),
            &rules(&["RRULE:FREQ=SOMETIMES"]),
            &Tz::UTC,
            utc(3, 1, 0),
            utc(4, 1, 0),
        )
        .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidRecurrence(_)));
    }
}
