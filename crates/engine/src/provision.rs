// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox provisioning
//!
//! A sandbox is a Python virtual environment created in the workspace
//! itself. The marker file is the only durable record that provisioning
//! and installs finished; without it everything is redone from scratch.

use crate::error::ExecutorError;
use crate::workspace::Workspace;
use bx_adapters::{CommandSpec, ProcessAdapter, ProcessOutput};
use bx_core::Settings;
use std::path::PathBuf;
use std::time::Duration;

/// What [`Provisioner::ensure`] found or did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Marker present; nothing was run
    Cached { transcript: String },
    /// Sandbox created and its package manager upgraded
    Created,
}

/// Creates virtual environments inside workspaces
#[derive(Clone)]
pub struct Provisioner<P> {
    process: P,
    python: PathBuf,
    system_site_packages: bool,
    https_proxy: Option<String>,
    step_timeout: Duration,
}

impl<P: ProcessAdapter> Provisioner<P> {
    pub fn new(process: P, settings: &Settings) -> Self {
        Self {
            process,
            python: settings.python.clone(),
            system_site_packages: !settings.disable_site_packages,
            https_proxy: settings.https_proxy.clone(),
            step_timeout: settings.install_timeout,
        }
    }

    /// Bring `ws` to the provisioned state unless its marker says it
    /// already is. Process output is appended to `log`.
    pub async fn ensure(
        &self,
        ws: &Workspace,
        log: &mut Vec<String>,
    ) -> Result<ProvisionOutcome, ExecutorError> {
        if !ws.exists() {
            return Err(ExecutorError::ReuploadRequired(format!(
                "Blueprint directory {} not found. Upload the blueprint again.",
                ws.path().display()
            )));
        }
        if !ws.has_descriptor() {
            return Err(ExecutorError::ReuploadRequired(format!(
                "Blueprint directory {} exists but has no TOSCA meta file. Upload the blueprint again.",
                ws.path().display()
            )));
        }

        if let Some(transcript) = ws.read_marker()? {
            tracing::info!(workspace = %ws.path().display(), "marker found, skipping provisioning");
            return Ok(ProvisionOutcome::Cached { transcript });
        }

        self.create_venv(ws, log).await?;
        self.upgrade_pip(ws, log).await?;
        Ok(ProvisionOutcome::Created)
    }

    /// `<python> -m venv [--system-site-packages] <workspace>`
    pub async fn create_venv(
        &self,
        ws: &Workspace,
        log: &mut Vec<String>,
    ) -> Result<(), ExecutorError> {
        let mut spec = CommandSpec::new(self.python.display().to_string()).args(["-m", "venv"]);
        if self.system_site_packages {
            spec = spec.arg("--system-site-packages");
        }
        let spec = spec.arg(ws.path().display().to_string());

        tracing::info!(workspace = %ws.path().display(), "creating virtual environment");
        self.run_step(&spec, log).await.map_err(|detail| {
            ExecutorError::Provisioning(format!(
                "could not create virtual environment in {}: {}",
                ws.path().display(),
                detail
            ))
        })
    }

    /// The package manager bundled with a fresh venv is usually stale
    async fn upgrade_pip(&self, ws: &Workspace, log: &mut Vec<String>) -> Result<(), ExecutorError> {
        let mut spec = CommandSpec::new(ws.bin("pip").display().to_string())
            .args(["install", "--upgrade", "pip"]);
        if let Some(proxy) = &self.https_proxy {
            spec = spec.env("https_proxy", proxy);
        }

        self.run_step(&spec, log).await.map_err(|detail| {
            ExecutorError::Provisioning(format!(
                "could not upgrade pip in {}: {}",
                ws.path().display(),
                detail
            ))
        })
    }

    async fn run_step(&self, spec: &CommandSpec, log: &mut Vec<String>) -> Result<(), String> {
        let output = self
            .process
            .run(spec, Some(self.step_timeout))
            .await
            .map_err(|e| e.to_string())?;
        collect_output(&output, log);
        failure_detail(&output, self.step_timeout).map_or(Ok(()), Err)
    }
}

/// Append stdout (and stderr of failed runs) to `log`, one entry per line
pub(crate) fn collect_output(output: &ProcessOutput, log: &mut Vec<String>) {
    let mut push = |bytes: &[u8]| {
        log.extend(
            String::from_utf8_lossy(bytes)
                .lines()
                .map(str::trim_end)
                .filter(|l| !l.trim().is_empty())
                .map(String::from),
        )
    };
    push(&output.stdout);
    if !output.success() {
        push(&output.stderr);
    }
}

/// `None` for a clean exit, otherwise a short description of what went wrong
pub(crate) fn failure_detail(output: &ProcessOutput, timeout: Duration) -> Option<String> {
    if output.timed_out {
        return Some(format!("timeout after {} seconds", timeout.as_secs()));
    }
    if output.success() {
        return None;
    }
    let stderr = output.stderr_lossy();
    let stderr = stderr.trim();
    Some(if !stderr.is_empty() {
        stderr.to_string()
    } else {
        match output.exit_code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    })
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
