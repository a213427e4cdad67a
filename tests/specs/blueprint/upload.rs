//! Upload specs
//!
//! Archives land in `<deploy>/<name>/<version>/<uuid>`.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn zip_upload_extracts_into_workspace() {
    let env = Env::new();
    let archive = env.zip(
        "bp.zip",
        &[DESCRIPTOR, ("Scripts/python/configure.py", "print('hi')\n")],
    );

    env.bx()
        .args(&["upload"])
        .args(&BLUEPRINT)
        .args(&[archive.to_str().unwrap()])
        .passes()
        .stdout_has("uploaded");

    assert!(env.workspace().join("TOSCA-Metadata/TOSCA.meta").is_file());
    assert_eq!(
        std::fs::read_to_string(env.workspace().join("Scripts/python/configure.py")).unwrap(),
        "print('hi')\n"
    );
}

#[test]
fn gzip_upload_is_reported_as_unsupported() {
    let env = Env::new();
    let archive = env.file("bp.tar.gz", "\x1f\u{8b}");

    env.bx()
        .args(&["upload", "--format", "gzip"])
        .args(&BLUEPRINT)
        .args(&[archive.to_str().unwrap()])
        .fails()
        .stdout_has("not implemented");
}

#[test]
fn unknown_format_is_rejected_by_name() {
    let env = Env::new();
    let archive = env.file("bp.tar", "data");

    env.bx()
        .args(&["upload", "--format", "tar"])
        .args(&BLUEPRINT)
        .args(&[archive.to_str().unwrap()])
        .fails()
        .stdout_has("Archive type tar is not valid.");

    assert!(!env.workspace().exists());
}

#[test]
fn upload_result_as_json() {
    let env = Env::new();
    let archive = env.zip("bp.zip", &[DESCRIPTOR]);

    let result = env
        .bx()
        .args(&["-o", "json", "upload"])
        .args(&BLUEPRINT)
        .args(&[archive.to_str().unwrap()])
        .passes()
        .json();

    assert_eq!(result["success"], serde_json::json!(true));
}

#[test]
fn escaping_identity_is_refused() {
    let env = Env::new();
    let archive = env.zip("bp.zip", &[DESCRIPTOR]);

    env.bx()
        .args(&["upload", "--name", "vFW", "--version", "..", "--uuid", "a1b2"])
        .args(&[archive.to_str().unwrap()])
        .fails()
        .stdout_has("not a valid path component");
}
