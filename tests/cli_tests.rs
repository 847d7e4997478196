//! Integration tests for the pilet-data CLI
//!
//! These tests run the actual binary and verify output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the binary to test
fn cli() -> Command {
    Command::cargo_bin("pilet-data").unwrap()
}

fn write_script(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("script.yaml");
    fs::write(&path, body).unwrap();
    path
}

const OWNERSHIP_SCRIPT: &str = r#"
schema: pilet-data/script@0.1
state:
  foo: 5
  app:
    data:
      foo: 10
      bar: { owner: you, value: 5 }
steps:
  - try_write: { name: bar, value: 10, owner: me }
  - write: { name: fi, value: 0 }
  - read: bar
"#;

#[test]
fn test_help_flag() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("key-value data store"));
}

#[test]
fn test_run_help_lists_flags() {
    cli()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--events"))
        .stdout(predicate::str::contains("--json"));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_accepts_good_script() {
    let dir = TempDir::new().unwrap();
    let file = write_script(&dir, OWNERSHIP_SCRIPT);

    cli()
        .arg("validate")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("Steps: 3"))
        .stdout(predicate::str::contains("Initial items: 2"));
}

#[test]
fn test_validate_rejects_wrong_schema() {
    let dir = TempDir::new().unwrap();
    let file = write_script(&dir, "schema: other/workflow@0.1\nsteps:\n  - read: x\n");

    cli()
        .arg("validate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("PD-010"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_validate_missing_file() {
    cli()
        .args(["validate", "/definitely/not/here.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_prints_outcomes_and_state() {
    let dir = TempDir::new().unwrap();
    let file = write_script(&dir, OWNERSHIP_SCRIPT);

    cli()
        .arg("run")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("try_write bar: rejected"))
        .stdout(predicate::str::contains("write fi: stored"))
        .stdout(predicate::str::contains("State:"))
        .stdout(predicate::str::contains("Events:").not());
}

#[test]
fn test_run_json_report() {
    let dir = TempDir::new().unwrap();
    let file = write_script(&dir, OWNERSHIP_SCRIPT);

    let output = cli().arg("run").arg(&file).arg("--json").output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcomes"][0]["accepted"], false);
    assert_eq!(report["state"]["foo"], 5);
    assert_eq!(report["state"]["app"]["data"]["bar"]["owner"], "you");
    assert_eq!(
        report["state"]["app"]["data"]["fi"],
        serde_json::json!({ "value": 0, "owner": null, "target": null, "expires": null })
    );

    let data_events = report["events"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["kind"]["type"] == "store_data")
        .count();
    assert_eq!(data_events, 1);
}

#[test]
fn test_run_with_events() {
    let dir = TempDir::new().unwrap();
    let file = write_script(&dir, OWNERSHIP_SCRIPT);

    cli()
        .arg("run")
        .arg(&file)
        .arg("--events")
        .assert()
        .success()
        .stdout(predicate::str::contains("Events:"))
        .stdout(predicate::str::contains("script_started"))
        .stdout(predicate::str::contains("store_data"));
}

#[test]
fn test_run_rejects_empty_name() {
    let dir = TempDir::new().unwrap();
    let file = write_script(
        &dir,
        "schema: pilet-data/script@0.1\nsteps:\n  - write: { name: '', value: 1 }\n",
    );

    cli()
        .arg("run")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("PD-011"));
}
