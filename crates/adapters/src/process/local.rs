// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process adapter backed by real child processes

use super::{CommandSpec, ProcessAdapter, ProcessError, ProcessOutput};
use async_trait::async_trait;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::fs::File;
use std::io::SeekFrom;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::process::Command;

/// Runs commands as children of this process.
///
/// Output goes to anonymous temp files rather than pipes, so a child that
/// floods its output cannot stall, and whatever it wrote before a timeout
/// is still readable afterwards. Each child leads its own process group so
/// a timeout takes down its descendants too.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalProcessAdapter;

impl LocalProcessAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessAdapter for LocalProcessAdapter {
    async fn run(
        &self,
        spec: &CommandSpec,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, ProcessError> {
        let stdout_file = tempfile::tempfile()?;
        let stderr_file = if spec.combine_output {
            stdout_file.try_clone()?
        } else {
            tempfile::tempfile()?
        };

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file.try_clone()?))
            .stderr(Stdio::from(stderr_file.try_clone()?))
            .process_group(0)
            .kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd.spawn().map_err(|e| ProcessError::SpawnFailed {
            program: spec.program.clone(),
            message: e.to_string(),
        })?;
        let pid = child.id();

        let status: Option<ExitStatus> = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => Some(status?),
                Err(_) => {
                    kill_group(pid);
                    if let Err(e) = child.kill().await {
                        tracing::debug!(error = %e, "child already gone after group kill");
                    }
                    None
                }
            },
            None => Some(child.wait().await?),
        };

        let stdout = read_back(stdout_file).await?;
        let stderr = if spec.combine_output {
            Vec::new()
        } else {
            read_back(stderr_file).await?
        };

        Ok(ProcessOutput {
            exit_code: status.and_then(|s| s.code()),
            timed_out: status.is_none(),
            stdout,
            stderr,
        })
    }
}

fn kill_group(pid: Option<u32>) {
    let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        tracing::debug!(pid, error = %e, "process group kill failed");
    }
}

async fn read_back(file: File) -> std::io::Result<Vec<u8>> {
    let mut file = tokio::fs::File::from_std(file);
    file.seek(SeekFrom::Start(0)).await?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).await?;
    Ok(buf)
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
