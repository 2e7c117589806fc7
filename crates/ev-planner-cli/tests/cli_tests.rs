use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

const MONDAY: &str = "2026-03-16";

fn evplan() -> Command {
    let mut cmd = Command::cargo_bin("evplan").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn slots_cmd(from: &str) -> Command {
    let mut cmd = evplan();
    cmd.arg("--config")
        .arg(fixture("planner.toml"))
        .arg("slots")
        .arg("--events")
        .arg(fixture("events.json"))
        .arg("--distances")
        .arg(fixture("distances.json"))
        .arg("--from")
        .arg(from);
    cmd
}

fn parse_output(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout should be JSON")
}

// ── calendars ───────────────────────────────────────────────────────────────

#[test]
fn test_calendars_lists_ids_and_summaries() {
    let output = evplan()
        .arg("calendars")
        .arg("--events")
        .arg(fixture("events.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = parse_output(&output.stdout);
    let calendars = json.as_array().unwrap();
    assert_eq!(calendars.len(), 2);
    assert_eq!(calendars[0]["id"], "work");
    assert_eq!(calendars[0]["summary"], "Work");
    assert_eq!(calendars[1]["id"], "personal");
}

#[test]
fn test_calendars_missing_file_fails() {
    evplan()
        .arg("calendars")
        .arg("--events")
        .arg(fixture("does-not-exist.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load events"));
}

// ── slots ───────────────────────────────────────────────────────────────────

#[test]
fn test_slots_ranked_by_added_distance() {
    let output = slots_cmd(MONDAY).output().unwrap();
    assert!(output.status.success());

    let json = parse_output(&output.stdout);
    let slots = json.as_array().unwrap();
    let summary: Vec<(&str, &str, u64)> = slots
        .iter()
        .map(|s| {
            (
                s["start"].as_str().unwrap(),
                s["end"].as_str().unwrap(),
                s["added_distance_meters"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("2026-03-16T15:00:00Z", "2026-03-16T17:00:00Z", 1200),
            ("2026-03-16T11:00:00Z", "2026-03-16T14:00:00Z", 5200),
            ("2026-03-16T09:00:00Z", "2026-03-16T10:00:00Z", 6000),
        ]
    );
    assert_eq!(slots[0]["comes_after"]["location"], "Gym");
    assert!(slots[0]["comes_before"].is_null());
    assert_eq!(slots[1]["comes_before"]["summary"], "Workout");
    assert_eq!(slots[0]["date"], "2026-03-16");
}

#[test]
fn test_longer_duration_drops_short_gaps() {
    let output = slots_cmd(MONDAY).arg("--duration").arg("150").output().unwrap();
    assert!(output.status.success());

    let json = parse_output(&output.stdout);
    let slots = json.as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["start"], "2026-03-16T11:00:00Z");
}

#[test]
fn test_single_calendar_override() {
    let output = slots_cmd(MONDAY).arg("--calendar").arg("work").output().unwrap();
    assert!(output.status.success());

    let json = parse_output(&output.stdout);
    let slots = json.as_array().unwrap();
    // 09-10 and 11-17 around the client visit only
    assert_eq!(slots.len(), 2);
}

#[test]
fn test_weekend_yields_empty_list() {
    slots_cmd("2026-03-21")
        .arg("--days")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn test_invalid_query_exits_with_validation_code() {
    slots_cmd(MONDAY)
        .arg("--days")
        .arg("0")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("number of days must be positive"));
}

#[test]
fn test_huge_duration_exits_with_validation_code() {
    slots_cmd(MONDAY)
        .arg("--duration")
        .arg("9223372036854775807")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("minimum duration must be at most"));
}

#[test]
fn test_unknown_calendar_is_rejected() {
    slots_cmd(MONDAY)
        .arg("--calendar")
        .arg("holidays")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("holidays"));
}

#[test]
fn test_missing_distance_table_fails() {
    evplan()
        .arg("--config")
        .arg(fixture("planner.toml"))
        .arg("slots")
        .arg("--events")
        .arg(fixture("events.json"))
        .arg("--distances")
        .arg(fixture("nope.json"))
        .arg("--from")
        .arg("2026-03-16")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_bad_date_is_usage_error() {
    slots_cmd("next tuesday")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--from"));
}

#[test]
fn test_pretty_output_is_multiline() {
    slots_cmd(MONDAY)
        .arg("--pretty")
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  {"));
}
