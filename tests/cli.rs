// ABOUTME: Black-box CLI tests running the compiled binary.
// ABOUTME: Covers argument parsing and early failures that need no cloud access.

use assert_cmd::Command;
use predicates::prelude::*;

fn skylift() -> Command {
    Command::cargo_bin("skylift").unwrap()
}

/// Test: top-level help lists the three subcommands.
#[test]
fn help_lists_subcommands() {
    skylift()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("status"));
}

/// Test: an unknown environment value is rejected at parse time.
#[test]
fn unknown_environment_is_rejected() {
    skylift()
        .args(["deploy", "--environment", "production"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

/// Test: running without a config file fails with a clear message and a
/// nonzero exit code.
#[test]
fn missing_config_file_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    skylift()
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configuration file not found"));
}

/// Test: an invalid stack name flag is rejected during resolution, before
/// any remote call.
#[test]
fn invalid_stack_name_flag_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("skylift.yml"), "service: mcp-server\n").unwrap();

    skylift()
        .current_dir(dir.path())
        .args(["status", "--stack-name", "9-starts-with-digit"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("stack name"));
}

/// Test: the environment flag accepts its documented values.
#[test]
fn environment_flag_accepts_known_values() {
    for env in ["dev", "staging", "prod"] {
        skylift()
            .args(["deploy", "--environment", env, "--help"])
            .assert()
            .success();
    }
}
