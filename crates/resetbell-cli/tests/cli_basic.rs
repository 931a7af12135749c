//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "resetbell-cli", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help() {
    let (_, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0);
}

#[test]
fn test_project_fast_path() {
    let (stdout, _, code) = run_cli(&["project", "--required", "3", "--current", "5"]);
    assert_eq!(code, 0, "project failed");
    assert!(stdout.contains("target already met (5 / 3)"));
}

#[test]
fn test_project_reports_future_date() {
    // Two weekly resets are always in the future regardless of "now".
    let (stdout, _, code) = run_cli(&[
        "project", "--required", "10", "--weekly", "5", "--weekend", "0", "--claimed", "true",
    ]);
    assert_eq!(code, 0, "project failed");
    assert!(stdout.contains("fulfillment date:"));
}

#[test]
fn test_project_rejects_missing_required() {
    let (_, stderr, code) = run_cli(&["project"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("--required"));
}
