//! Argument and input error specs

use crate::prelude::*;

#[test]
fn unknown_command_fails() {
    let env = Env::new();

    env.bx()
        .args(&["deploy"])
        .fails()
        .stderr_has("unrecognized subcommand");
}

#[test]
fn exec_requires_a_command() {
    let env = Env::new();

    env.bx().args(&["exec"]).args(&BLUEPRINT).fails();
}

#[test]
fn exec_rejects_zero_timeout() {
    let env = Env::new();

    env.bx()
        .args(&["exec", "--timeout", "0"])
        .args(&BLUEPRINT)
        .args(&["--", "echo", "hi"])
        .fails()
        .stderr_has("--timeout");
}

#[test]
fn upload_of_missing_archive_fails() {
    let env = Env::new();

    env.bx()
        .args(&["upload"])
        .args(&BLUEPRINT)
        .args(&["/nonexistent/blueprint.zip"])
        .fails()
        .stderr_has("reading archive");
}

#[test]
fn prepare_manifest_conflicts_with_package_flags() {
    let env = Env::new();

    env.bx()
        .args(&["prepare", "--manifest", "m.json", "--pip", "requests"])
        .args(&BLUEPRINT)
        .fails()
        .stderr_has("cannot be used with");
}
