//! Daemon logs specs
//!
//! Verify daemon logs command behavior.

use crate::prelude::*;

#[test]
fn daemon_logs_shows_startup_marker() {
    let env = Env::new();
    env.bx().args(&["daemon", "start"]).passes();

    env.bx()
        .args(&["daemon", "logs", "--lines", "10"])
        .passes()
        .stdout_has("bxd: starting");
}

#[test]
fn daemon_logs_show_clean_shutdown() {
    let env = Env::new();
    env.bx().args(&["daemon", "start"]).passes();
    env.bx().args(&["daemon", "stop"]).passes();

    env.bx()
        .args(&["daemon", "logs"])
        .passes()
        .stdout_has("Daemon ready")
        .stdout_has("Daemon stopped");
}

#[test]
fn daemon_logs_without_log_file() {
    let env = Env::new();

    env.bx()
        .args(&["daemon", "logs"])
        .passes()
        .stdout_has("No daemon log");
}
