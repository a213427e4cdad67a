// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running caller commands inside a blueprint sandbox

use crate::error::ExecutorError;
use crate::locks::WorkspaceLocks;
use crate::provision::Provisioner;
use crate::workspace::Workspace;
use bx_adapters::{CommandSpec, ProcessAdapter, ProcessOutput};
use bx_core::{shell_escape, BlueprintIdentity, ExecutionRequest};
use std::path::Path;
use std::time::Duration;

pub const ENV_REQUEST_ID: &str = "BX_REQUEST_ID";
pub const ENV_SUBREQUEST_ID: &str = "BX_SUBREQUEST_ID";
pub const ENV_ORIGINATOR_ID: &str = "BX_ORIGINATOR_ID";
pub const ENV_CORRELATION_ID: &str = "BX_CORRELATION_ID";

/// Raw result of one command, before classification
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The shell line actually run
    pub command_line: String,
    pub output: ProcessOutput,
}

/// Builds the execution context and runs one command under a timeout
#[derive(Clone)]
pub struct Runner<P> {
    process: P,
    provisioner: Provisioner<P>,
    locks: WorkspaceLocks,
}

impl<P: ProcessAdapter> Runner<P> {
    pub fn new(process: P, provisioner: Provisioner<P>, locks: WorkspaceLocks) -> Self {
        Self {
            process,
            provisioner,
            locks,
        }
    }

    pub async fn run(
        &self,
        ws: &Workspace,
        identity: &BlueprintIdentity,
        request: &ExecutionRequest,
    ) -> Result<RunOutcome, ExecutorError> {
        if !ws.exists() {
            return Err(ExecutorError::ReuploadRequired(format!(
                "Blueprint directory {} not found. Upload the blueprint again.",
                identity.key()
            )));
        }

        self.ensure_sandbox(ws).await?;

        if let Err(e) = ws.touch() {
            tracing::warn!(workspace = %ws.path().display(), error = %e, "could not refresh mtime");
        }

        let command_line = compose_command(ws, identity, request);
        let spec = command_spec(ws, identity, request, &command_line);
        tracing::info!(
            blueprint = %identity,
            timeout_secs = request.timeout_secs,
            "running command"
        );

        let output = self
            .process
            .run(&spec, Some(Duration::from_secs(request.timeout_secs)))
            .await
            .map_err(|e| {
                ExecutorError::Execution(format!("{} - failed to execute command: {}", identity.key(), e))
            })?;

        Ok(RunOutcome {
            command_line,
            output,
        })
    }

    /// Commands that need no declared packages still get a venv. Only the
    /// venv is created here; installs belong to prepare.
    async fn ensure_sandbox(&self, ws: &Workspace) -> Result<(), ExecutorError> {
        let _guard = self.locks.acquire(ws.path()).await;
        if ws.has_marker() || ws.bin("python").exists() {
            return Ok(());
        }
        tracing::info!(workspace = %ws.path().display(), "no sandbox yet, creating one");
        self.provisioner.create_venv(ws, &mut Vec::new()).await
    }
}

/// Rewrite the caller's command for this workspace.
///
/// Commands written against the old `name/version` layout are pointed at
/// `name/version/uuid`. Playbooks get the sandbox interpreter; anything else
/// gets the properties as one trailing JSON argument.
pub fn compose_command(
    ws: &Workspace,
    identity: &BlueprintIdentity,
    request: &ExecutionRequest,
) -> String {
    let legacy = identity.legacy_key();
    let current = identity.key();
    let mut command = if request.command.contains(&legacy) && !request.command.contains(&current) {
        request.command.replace(&legacy, &current)
    } else {
        request.command.clone()
    };

    if command.contains("ansible-playbook") {
        let interpreter = format!("ansible_python_interpreter={}", ws.bin("python").display());
        command.push_str(" -e ");
        command.push_str(&shell_escape(&interpreter));
    } else if let Some(properties) = non_empty_properties(request) {
        command.push(' ');
        command.push_str(&shell_escape(&properties.to_string()));
    }
    command
}

fn non_empty_properties(request: &ExecutionRequest) -> Option<&serde_json::Value> {
    request.properties.as_ref().filter(|p| match p {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        _ => true,
    })
}

fn command_spec(
    ws: &Workspace,
    identity: &BlueprintIdentity,
    request: &ExecutionRequest,
    command_line: &str,
) -> CommandSpec {
    let path = sandbox_path(&ws.path().join("bin"), std::env::var("PATH").ok().as_deref());
    CommandSpec::new("sh")
        .args(["-c", command_line])
        .cwd(ws.path())
        .env(ENV_REQUEST_ID, &identity.request_id)
        .env(ENV_SUBREQUEST_ID, &identity.sub_request_id)
        .env(
            ENV_ORIGINATOR_ID,
            request.originator_id.as_deref().unwrap_or_default(),
        )
        .env(
            ENV_CORRELATION_ID,
            request.correlation_id.as_deref().unwrap_or_default(),
        )
        .env("PATH", path)
        .env("VIRTUAL_ENV", ws.path().display().to_string())
        .combined()
}

/// `PATH` with the sandbox's `bin/` in front. An empty inherited value adds
/// no trailing separator, which `sh` would read as the working directory.
fn sandbox_path(bin: &Path, inherited: Option<&str>) -> String {
    match inherited.filter(|p| !p.is_empty()) {
        Some(rest) => format!("{}:{}", bin.display(), rest),
        None => bin.display().to_string(),
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
