//! Integration tests for the `hearth` binary.

use std::path::Path;
use std::process::Command;

fn hearth_bin() -> String {
    env!("CARGO_BIN_EXE_hearth").to_string()
}

/// Run `hearth` against `project_dir` and return (stdout, stderr, exit code).
fn run_hearth(project_dir: &Path, args: &[&str]) -> (String, String, Option<i32>) {
    let output = Command::new(hearth_bin())
        .args(args)
        .arg("--project-dir")
        .arg(project_dir)
        .env_remove("HEARTH_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute hearth with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code(),
    )
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

#[test]
fn test_check_passes() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_hearth(dir.path(), &["check"]);
    assert_eq!(code, Some(0));
    assert!(stdout.contains("Catalog OK: baseline v29"), "{stdout}");
}

#[test]
fn test_plan_on_new_project_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_hearth(dir.path(), &["plan", "--json"]);
    assert_eq!(code, Some(0));
    let plan = json(&stdout);
    assert_eq!(plan["current_version"], "fresh");
    assert_eq!(plan["applies_baseline"], true);
    assert!(!dir.path().join("data").exists());
}

#[test]
fn test_migrate_then_status() {
    let dir = tempfile::tempdir().unwrap();

    let (stdout, stderr, code) = run_hearth(dir.path(), &["migrate", "--json"]);
    assert_eq!(code, Some(0), "{stderr}");
    let report = json(&stdout);
    assert_eq!(report["state"], "completed");
    assert_eq!(report["baseline_applied"], true);
    assert!(dir.path().join("data/hearth.duckdb").exists());

    let (stdout, _, code) = run_hearth(dir.path(), &["status", "--json"]);
    assert_eq!(code, Some(0));
    let status = json(&stdout);
    assert_eq!(status["state"], "up_to_date");
    assert_eq!(status["history"].as_array().map(Vec::len), Some(4));

    let (stdout, _, code) = run_hearth(dir.path(), &["migrate"]);
    assert_eq!(code, Some(0));
    assert!(stdout.contains("Schema up to date"), "{stdout}");
}

#[test]
fn test_config_file_is_honoured() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("hearth.yml"),
        "database:\n  path: store/app.duckdb\n",
    )
    .unwrap();

    let (_, stderr, code) = run_hearth(dir.path(), &["migrate"]);
    assert_eq!(code, Some(0), "{stderr}");
    assert!(dir.path().join("store/app.duckdb").exists());
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hearth.yml"), "unknown_key: 1\n").unwrap();

    let (_, stderr, code) = run_hearth(dir.path(), &["plan"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("Failed to load config"), "{stderr}");
}
