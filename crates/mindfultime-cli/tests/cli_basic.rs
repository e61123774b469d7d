//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. They run
//! against the dev data directory (MINDFULTIME_ENV=dev).

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "mindfultime-cli", "--"])
        .args(args)
        .env("MINDFULTIME_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_task_list() {
    let (stdout, _stderr, code) = run_cli(&["task", "list"]);
    assert_eq!(code, 0, "Task list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(!parsed.as_array().unwrap().is_empty());
}

#[test]
fn test_task_list_by_category() {
    let (stdout, _stderr, code) = run_cli(&["task", "list", "--category", "meditation"]);
    assert_eq!(code, 0, "Task list by category failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    for task in parsed.as_array().unwrap() {
        assert_eq!(task["category"], "meditation");
    }
}

#[test]
fn test_task_recommend() {
    let (_stdout, _stderr, code) = run_cli(&["task", "recommend"]);
    assert_eq!(code, 0, "Task recommend failed");
}

#[test]
fn test_task_complete_unknown_fails() {
    let (_stdout, stderr, code) = run_cli(&["task", "complete", "no_such_task"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown task"));
}

#[test]
fn test_task_complete_and_balance() {
    let user = "cli-test-complete";
    let (stdout, _stderr, code) = run_cli(&[
        "task",
        "complete",
        "meditation_breathing",
        "--user",
        user,
    ]);
    assert_eq!(code, 0, "Task complete failed");
    assert!(stdout.contains("earned"));

    let (stdout, _stderr, code) = run_cli(&["rewards", "balance", "--user", user]);
    assert_eq!(code, 0, "Rewards balance failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["total_earned"].as_u64().unwrap() >= 10);
}

#[test]
fn test_rewards_bonuses() {
    let (stdout, _stderr, code) = run_cli(&["rewards", "bonuses"]);
    assert_eq!(code, 0, "Rewards bonuses failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 4);
}

#[test]
fn test_rewards_history() {
    let (_stdout, _stderr, code) = run_cli(&["rewards", "history", "--limit", "5"]);
    assert_eq!(code, 0, "Rewards history failed");
}

#[test]
fn test_rewards_summary() {
    let (_stdout, _stderr, code) = run_cli(&["rewards", "summary"]);
    assert_eq!(code, 0, "Rewards summary failed");
}

#[test]
fn test_achievements_list() {
    let (stdout, _stderr, code) = run_cli(&["achievements", "list"]);
    assert_eq!(code, 0, "Achievements list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 9);
}

#[test]
fn test_apps_lifecycle() {
    let user = "cli-test-apps";
    let (stdout, _stderr, code) = run_cli(&[
        "apps", "add", "Test App", "com.example.test", "--limit", "30", "--user", user,
    ]);
    assert_eq!(code, 0, "Apps add failed");
    assert!(stdout.contains("App registered"));

    let (stdout, _stderr, code) = run_cli(&["apps", "list", "--user", user]);
    assert_eq!(code, 0, "Apps list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let app_id = parsed.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();

    let (stdout, _stderr, code) =
        run_cli(&["apps", "record-usage", &app_id, "40", "--user", user]);
    assert_eq!(code, 0, "Apps record-usage failed");
    assert!(stdout.contains("0 remaining"));

    let (_stdout, _stderr, code) = run_cli(&["apps", "reset-daily", "--user", user]);
    assert_eq!(code, 0, "Apps reset-daily failed");
}

#[test]
fn test_apps_sweep() {
    let (_stdout, _stderr, code) = run_cli(&["apps", "sweep"]);
    assert_eq!(code, 0, "Apps sweep failed");
}

#[test]
fn test_stats_show() {
    let (_stdout, _stderr, code) = run_cli(&["stats", "show"]);
    assert_eq!(code, 0, "Stats show failed");
}

#[test]
fn test_config_get_set_list() {
    let (_stdout, _stderr, code) = run_cli(&["config", "set", "theme", "dark"]);
    assert_eq!(code, 0, "Config set failed");

    let (stdout, _stderr, code) = run_cli(&["config", "get", "theme"]);
    assert_eq!(code, 0, "Config get failed");
    assert_eq!(stdout.trim(), "dark");

    let (stdout, _stderr, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "Config list failed");
    assert!(stdout.contains("goals.daily_goal_minutes"));
}
