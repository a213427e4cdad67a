//! Exec specs
//!
//! Blueprints are uploaded and marked prepared first, so these run plain
//! shell scripts without a virtualenv.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn exec_prints_script_output() {
    let env = Env::new();
    env.uploaded(&[("Scripts/hello.sh", "echo hello from blueprint\n")]);

    env.bx()
        .args(&["exec"])
        .args(&BLUEPRINT)
        .args(&["--", "sh", "Scripts/hello.sh"])
        .passes()
        .stdout_has("hello from blueprint");
}

#[test]
fn exec_passes_properties_as_last_argument() {
    let env = Env::new();
    env.uploaded(&[("Scripts/args.sh", "echo \"props=$1\"\n")]);

    env.bx()
        .args(&["exec", "--properties", r#"{"vnf": "fw-1"}"#])
        .args(&BLUEPRINT)
        .args(&["--", "sh", "Scripts/args.sh"])
        .passes()
        .stdout_has(r#"props={"vnf":"fw-1"}"#);
}

#[test]
fn exec_exports_request_ids() {
    let env = Env::new();
    env.uploaded(&[("Scripts/ids.sh", "echo \"req=$BX_REQUEST_ID\"\n")]);

    env.bx()
        .args(&["exec", "--request-id", "req-42"])
        .args(&BLUEPRINT)
        .args(&["--", "sh", "Scripts/ids.sh"])
        .passes()
        .stdout_has("req=req-42");
}

#[test]
fn exec_returns_payload_separately_from_log() {
    let env = Env::new();
    env.uploaded(&[(
        "Scripts/payload.sh",
        "echo configuring\n\
echo BEGIN_EXTRA_PAYLOAD\n\
echo '{\"vnf_id\": \"abc\"}'\n\
echo END_EXTRA_PAYLOAD\n",
    )]);

    let result = env
        .bx()
        .args(&["-o", "json", "exec"])
        .args(&BLUEPRINT)
        .args(&["--", "sh", "Scripts/payload.sh"])
        .passes()
        .json();

    assert_eq!(result["log_lines"], serde_json::json!(["configuring"]));
    assert_eq!(result["payload"], serde_json::json!({"vnf_id": "abc"}));
}

#[test]
fn failing_script_exits_nonzero_with_status() {
    let env = Env::new();
    env.uploaded(&[("Scripts/fail.sh", "echo before failing\nexit 3\n")]);

    env.bx()
        .args(&["exec"])
        .args(&BLUEPRINT)
        .args(&["--", "sh", "Scripts/fail.sh"])
        .fails()
        .stdout_has("before failing")
        .stdout_has("error: command exited with status 3");
}

#[test]
fn script_reported_error_replaces_status() {
    let env = Env::new();
    env.uploaded(&[(
        "Scripts/err.sh",
        "echo BEGIN_EXTRA_RET_ERR_MSG\necho vnf unreachable\necho END_EXTRA_RET_ERR_MSG\nexit 1\n",
    )]);

    env.bx()
        .args(&["exec"])
        .args(&BLUEPRINT)
        .args(&["--", "sh", "Scripts/err.sh"])
        .fails()
        .stdout_has("error: vnf unreachable")
        .stdout_lacks("BEGIN_EXTRA_RET_ERR_MSG");
}

#[test]
fn slow_script_is_killed_at_timeout() {
    let env = Env::new();
    env.uploaded(&[("Scripts/slow.sh", "echo started\nsleep 30\necho never\n")]);

    env.bx()
        .args(&["exec", "--timeout", "1"])
        .args(&BLUEPRINT)
        .args(&["--", "sh", "Scripts/slow.sh"])
        .fails()
        .stdout_has("started")
        .stdout_has("timeout of 1 seconds exceeded")
        .stdout_lacks("never");
}

#[test]
fn exec_without_upload_asks_for_reupload() {
    let env = Env::new();

    env.bx()
        .args(&["exec"])
        .args(&BLUEPRINT)
        .args(&["--", "sh", "Scripts/hello.sh"])
        .fails()
        .stdout_has("blueprint must be uploaded again");
}
