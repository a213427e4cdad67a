// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CommandSpec, ProcessAdapter, ProcessError, ProcessOutput};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Scripted {
    Output(ProcessOutput),
    SpawnFailure(String),
}

/// Fake process adapter for testing.
///
/// Responses are matched by substring against the command line; the first
/// matching rule wins. Unmatched commands exit 0 with no output.
#[derive(Clone, Default)]
pub struct FakeProcessAdapter {
    rules: Arc<Mutex<Vec<(String, Scripted)>>>,
    calls: Arc<Mutex<Vec<(CommandSpec, Option<Duration>)>>>,
}

impl FakeProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands whose line contains `pattern` with `output`
    pub fn respond(&self, pattern: &str, output: ProcessOutput) {
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((pattern.to_string(), Scripted::Output(output)));
    }

    /// Fail to spawn commands whose line contains `pattern`
    pub fn fail_spawn(&self, pattern: &str, message: &str) {
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((pattern.to_string(), Scripted::SpawnFailure(message.to_string())));
    }

    /// Get all recorded commands
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(spec, _)| spec.clone())
            .collect()
    }

    /// Recorded command lines, in call order
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(CommandSpec::command_line).collect()
    }

    /// Timeouts passed alongside each call
    pub fn timeouts(&self) -> Vec<Option<Duration>> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, timeout)| *timeout)
            .collect()
    }
}

#[async_trait]
impl ProcessAdapter for FakeProcessAdapter {
    async fn run(
        &self,
        spec: &CommandSpec,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, ProcessError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((spec.clone(), timeout));

        let line = spec.command_line();
        let scripted = self
            .rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, scripted)| scripted.clone());

        match scripted {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::SpawnFailure(message)) => Err(ProcessError::SpawnFailed {
                program: spec.program.clone(),
                message,
            }),
            None => Ok(ProcessOutput::exited(0)),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
