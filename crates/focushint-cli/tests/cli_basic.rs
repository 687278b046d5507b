//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary home directory
//! and parses the JSON it prints.

use std::io::Write;
use std::process::{Command, Stdio};

use serde::Deserialize;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str], stdin: Option<&str>) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_focushint"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("FOCUSHINT_ENV")
        .env_remove("OLLAMA_MODEL")
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    if let Some(input) = stdin {
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
    }
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn run_ok(home: &TempDir, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args, None);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

#[derive(Deserialize)]
struct HintOut {
    id: i64,
    category: String,
    priority: String,
    title: String,
    status: String,
}

#[derive(Deserialize)]
struct PendingOut {
    hints: Vec<HintOut>,
    count: usize,
}

/// Point the backend at a port nothing listens on.
fn offline_backend(home: &TempDir) {
    run_ok(home, &["config", "set", "model.base_url", "http://127.0.0.1:9"]);
    run_ok(home, &["config", "set", "model.probe_timeout_secs", "1"]);
}

#[test]
fn test_config_roundtrip() {
    let home = TempDir::new().unwrap();
    assert_eq!(run_ok(&home, &["config", "get", "gate.min_spacing_secs"]).trim(), "5");

    run_ok(&home, &["config", "set", "gate.min_spacing_secs", "9"]);
    assert_eq!(run_ok(&home, &["config", "get", "gate.min_spacing_secs"]).trim(), "9");

    let (_, stderr, code) = run_cli(&home, &["config", "get", "gate.nope"], None);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));

    run_ok(&home, &["config", "reset"]);
    assert_eq!(run_ok(&home, &["config", "get", "gate.min_spacing_secs"]).trim(), "5");
}

#[test]
fn test_trigger_then_acknowledge() {
    let home = TempDir::new().unwrap();
    let out = run_ok(&home, &["trigger", "laptop", "break-reminder", "--break-number", "2"]);
    let hint: HintOut = serde_json::from_str(&out).unwrap();
    assert_eq!(hint.category, "break_reminder");
    assert_eq!(hint.priority, "high");
    assert_eq!(hint.title, "Break time!");

    run_ok(&home, &["event", "remind", "laptop", "Standup"]);

    let pending: PendingOut =
        serde_json::from_str(&run_ok(&home, &["hints", "pending", "laptop"])).unwrap();
    assert_eq!(pending.count, 2);
    assert_eq!(pending.hints[0].id, hint.id);

    let id = hint.id.to_string();
    let shown: HintOut =
        serde_json::from_str(&run_ok(&home, &["hints", "status", &id, "shown"])).unwrap();
    assert_eq!(shown.status, "shown");

    let (_, stderr, code) = run_cli(&home, &["hints", "status", &id, "pending"], None);
    assert_eq!(code, 1);
    assert!(stderr.contains("back to"));

    let (_, stderr, code) = run_cli(&home, &["hints", "status", "999", "shown"], None);
    assert_eq!(code, 1);
    assert!(stderr.contains("hint not found: 999"));
}

#[test]
fn test_prefs_create_on_read_and_patch() {
    let home = TempDir::new().unwrap();

    let (_, stderr, code) =
        run_cli(&home, &["prefs", "set", "laptop", "--max-hints-per-hour", "3"], None);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));

    let prefs: serde_json::Value =
        serde_json::from_str(&run_ok(&home, &["prefs", "get", "laptop"])).unwrap();
    assert_eq!(prefs["max_hints_per_hour"], 10);

    let prefs: serde_json::Value = serde_json::from_str(&run_ok(
        &home,
        &["prefs", "set", "laptop", "--max-hints-per-hour", "3", "--enable-workflow-tips", "false"],
    ))
    .unwrap();
    assert_eq!(prefs["max_hints_per_hour"], 3);
    assert_eq!(prefs["enable_workflow_tips"], false);
}

#[test]
fn test_activity_report_without_backend() {
    let home = TempDir::new().unwrap();
    offline_backend(&home);

    let report = r#"{
        "device_id": "laptop",
        "activities": [
            {"app_name": "Code", "window_title": "main.rs", "started_at": "2026-01-05T09:00:00Z", "duration_seconds": 120}
        ]
    }"#;
    let (stdout, stderr, code) = run_cli(&home, &["activity", "report"], Some(report));
    assert_eq!(code, 0, "{stderr}");
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["records"].as_array().unwrap().len(), 1);
    assert!(out["hint"].is_null());

    let listed: serde_json::Value =
        serde_json::from_str(&run_ok(&home, &["activity", "list", "laptop"])).unwrap();
    assert_eq!(listed[0]["app_name"], "Code");

    let (_, _, code) = run_cli(&home, &["activity", "report"], Some(r#"{"device_id": "", "activities": []}"#));
    assert_eq!(code, 1);
}
