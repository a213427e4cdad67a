//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let env = Env::new();

    env.bx()
        .args(&["--help"])
        .passes()
        .stdout_has("upload")
        .stdout_has("prepare")
        .stdout_has("exec")
        .stdout_has("daemon");
}

#[test]
fn exec_help_shows_timeout_and_properties() {
    let env = Env::new();

    env.bx()
        .args(&["exec", "--help"])
        .passes()
        .stdout_has("--timeout")
        .stdout_has("--properties");
}

#[test]
fn version_flag_prints_version() {
    let env = Env::new();

    env.bx()
        .args(&["--version"])
        .passes()
        .stdout_has(env!("CARGO_PKG_VERSION"));
}
