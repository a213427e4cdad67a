// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::process::{CommandSpec, ProcessAdapter, ProcessError, ProcessOutput};
use async_trait::async_trait;
use std::time::Duration;

/// Wrapper that adds tracing to any ProcessAdapter
#[derive(Clone)]
pub struct TracedProcessAdapter<P> {
    inner: P,
}

impl<P> TracedProcessAdapter<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: ProcessAdapter> ProcessAdapter for TracedProcessAdapter<P> {
    async fn run(
        &self,
        spec: &CommandSpec,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, ProcessError> {
        let span = tracing::info_span!("process.run", program = %spec.program);
        let _guard = span.enter();

        tracing::info!(
            cmd = %spec.command_line(),
            env_count = spec.env.len(),
            timeout_secs = timeout.map(|t| t.as_secs()),
            "starting"
        );

        // Precondition: cwd must exist
        if let Some(cwd) = &spec.cwd {
            if !cwd.is_dir() {
                tracing::error!(cwd = %cwd.display(), "working directory does not exist");
                return Err(ProcessError::MissingCwd(cwd.clone()));
            }
        }

        let start = std::time::Instant::now();
        let result = self.inner.run(spec, timeout).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(out) if out.timed_out => tracing::warn!(
                elapsed_ms,
                captured_len = out.stdout.len(),
                "timed out, process killed"
            ),
            Ok(out) => tracing::info!(
                elapsed_ms,
                exit_code = out.exit_code,
                stdout_len = out.stdout.len(),
                stderr_len = out.stderr.len(),
                "process exited"
            ),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "run failed"),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
