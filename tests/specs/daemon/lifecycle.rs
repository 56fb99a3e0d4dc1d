//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status lifecycle.

use crate::prelude::*;

#[test]
fn daemon_status_when_not_running() {
    let temp = Project::empty();

    temp.sj()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_success() {
    let temp = Project::empty();

    temp.sj()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon started");
}

#[test]
fn daemon_start_twice_is_harmless() {
    let temp = Project::empty();
    temp.sj().args(&["daemon", "start"]).passes();

    temp.sj()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon already running");
}

#[test]
fn daemon_status_shows_details_after_start() {
    let temp = Project::empty();
    temp.sj().args(&["daemon", "start"]).passes();

    temp.sj()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running")
        .stdout_has("Version:")
        .stdout_has("Uptime:")
        .stdout_has("Actions: 1");
}

#[test]
fn daemon_stop_reports_success() {
    let temp = Project::empty();
    temp.sj().args(&["daemon", "start"]).passes();

    temp.sj()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopped");
    temp.sj()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_invalid_settings() {
    let temp = Project::empty();
    temp.file("sj.toml", "[[action]]\nid = \"broken\"\n");

    temp.sj()
        .args(&["daemon", "start"])
        .fails()
        .stderr_has("invalid settings");
}

#[test]
fn daemon_writes_log_with_startup_marker() {
    let temp = Project::empty();
    temp.sj().args(&["daemon", "start"]).passes();

    let log = std::fs::read_to_string(temp.path().join(".sj/daemon.log")).unwrap();
    assert!(log.contains("--- sjd: starting (pid: "));
}
