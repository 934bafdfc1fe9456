//! Integration tests for the `ad2kp-sim` binary.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn sim_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ad2kp-sim");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_flag() {
    sim_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--interval-ms").and(predicate::str::contains("--port")));
}

#[test]
fn test_missing_log_exits_1() {
    sim_cmd()
        .arg("/tmp/ad2kp-sim-test-nonexistent/log.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read replay log"));
}

#[test]
fn test_empty_log_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    std::fs::write(&path, "\n").unwrap();

    sim_cmd()
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no lines to send"));
}

#[test]
fn test_log_argument_is_required() {
    sim_cmd().assert().code(2);
}
