//! End-to-end runs of the `planwise` binary against a temporary home.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn planwise(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_planwise"))
        .env("HOME", home)
        .env("PLANWISE_HOME", home.join(".planwise"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run planwise")
}

fn ok(output: &Output) -> String {
    assert!(
        output.status.success(),
        "planwise failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

const TASKS: &str = r#"[
  {"id":"overdue","title":"Overdue problem set","deadline":"2020-01-01","estimated_effort":1.0,"weight":10},
  {"id":"essay","title":"Term essay","deadline":"2099-05-01T17:00:00Z","estimated_effort":3.0,"weight":30},
  {"id":"fuzzy","title":"Reading","deadline":"sometime soon","estimated_effort":0.5},
  {"id":"done","title":"Old lab","status":"completed","burnout_rating":1,"updated_at":"2026-01-01T00:00:00+00:00"}
]"#;

fn seeded_home() -> TempDir {
    let temp = TempDir::new().unwrap();
    ok(&planwise(temp.path(), &["init"]));
    std::fs::write(temp.path().join(".planwise/tasks.json"), TASKS).unwrap();
    temp
}

#[test]
fn init_writes_config_and_task_file() {
    let temp = TempDir::new().unwrap();
    let out = ok(&planwise(temp.path(), &["init"]));
    assert!(out.contains("config.toml"));

    let home = temp.path().join(".planwise");
    let config = std::fs::read_to_string(home.join("config.toml")).unwrap();
    assert!(config.contains("[schedule]"));
    assert_eq!(std::fs::read_to_string(home.join("tasks.json")).unwrap().trim(), "[]");

    let again = ok(&planwise(temp.path(), &["init"]));
    assert!(again.contains("already exists"));
}

#[test]
fn prioritize_ranks_overdue_first_and_writes_scores() {
    let temp = seeded_home();
    let out = ok(&planwise(temp.path(), &["prioritize"]));
    let first_row = out.lines().nth(1).unwrap();
    assert!(first_row.contains("overdue"), "{out}");
    assert!(!out.contains("Old lab"));

    ok(&planwise(temp.path(), &["prioritize", "--write"]));
    let after: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(temp.path().join(".planwise/tasks.json")).unwrap(),
    )
    .unwrap();
    // overdue: urgency 100, importance 20, effort factor 95
    assert_eq!(after[0]["priority_score"], serde_json::json!(75.0));
}

#[test]
fn risk_lists_factors_and_rejects_unknown_ids() {
    let temp = seeded_home();
    let out = ok(&planwise(temp.path(), &["risk", "essay"]));
    assert!(out.contains("Deadline is far away"));
    assert!(out.contains("Recent high burnout detected"));

    let missing = planwise(temp.path(), &["risk", "nope"]);
    assert!(!missing.status.success());
}

#[test]
fn schedule_day_saves_blocks() {
    let temp = seeded_home();
    let out = ok(&planwise(
        temp.path(),
        &["schedule", "day", "--date", "2026-02-16", "--technique", "none"],
    ));
    assert!(out.contains("09:00-10:00  work"), "{out}");

    let saved = std::fs::read_to_string(temp.path().join(".planwise/schedules/2026-02-16.json")).unwrap();
    assert!(saved.contains("\"type\": \"work\""));
    assert!(saved.contains("\"task_id\": \"overdue\""));
}

#[test]
fn schedule_week_honours_unavailable_text_and_exports_ics() {
    let temp = seeded_home();
    let ics = temp.path().join("week.ics");
    let out = ok(&planwise(
        temp.path(),
        &[
            "schedule",
            "week",
            "--start-date",
            "2026-02-16",
            "--technique",
            "none",
            "--unavailable",
            "monday 9-10 standup",
            "--ics",
            ics.to_str().unwrap(),
        ],
    ));
    assert_eq!(out.matches("## ").count(), 7, "{out}");
    assert!(out.contains("09:00-10:00  busy"), "{out}");

    let schedules = std::fs::read_dir(temp.path().join(".planwise/schedules")).unwrap();
    assert_eq!(schedules.count(), 7);

    let calendar = std::fs::read_to_string(&ics).unwrap();
    assert!(calendar.starts_with("BEGIN:VCALENDAR"));
    assert!(calendar.contains("SUMMARY:Unavailable: standup"));
}

#[test]
fn invalid_work_hours_fail_cleanly() {
    let temp = seeded_home();
    let out = planwise(
        temp.path(),
        &["schedule", "day", "--date", "2026-02-16", "--start", "18", "--end", "9"],
    );
    assert!(!out.status.success());
}
