//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status lifecycle.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn daemon_status_when_not_running() {
    let env = Env::new();

    env.bx()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_success() {
    let env = Env::new();

    env.bx()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon started");
}

#[test]
fn daemon_start_twice_reports_already_running() {
    let env = Env::new();
    env.bx().args(&["daemon", "start"]).passes();

    env.bx()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon already running");
}

#[test]
fn daemon_status_shows_running_details() {
    let env = Env::new();
    env.bx().args(&["daemon", "start"]).passes();

    env.bx()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon running")
        .stdout_has("Uptime:")
        .stdout_has("Active requests: 0")
        .stdout_has(&format!("Version: {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn daemon_status_as_json() {
    let env = Env::new();

    let status = env.bx().args(&["-o", "json", "daemon", "status"]).passes().json();

    assert_eq!(status, serde_json::json!({"running": false}));
}

#[test]
fn daemon_stop_reports_success() {
    let env = Env::new();
    env.bx().args(&["daemon", "start"]).passes();

    env.bx()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopped");
    env.bx()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_stop_when_not_running() {
    let env = Env::new();

    env.bx()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_creates_deploy_dir() {
    let env = Env::new();
    env.bx().args(&["daemon", "start"]).passes();

    assert!(env.deploy_dir().is_dir());
}
