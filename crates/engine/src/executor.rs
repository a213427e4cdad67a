// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request-level façade over the workspace store, provisioner, installer
//! and runner

use crate::error::ExecutorError;
use crate::install::Installer;
use crate::locks::WorkspaceLocks;
use crate::provision::{ProvisionOutcome, Provisioner};
use crate::runner::{RunOutcome, Runner};
use crate::upload;
use crate::workspace::WorkspaceStore;
use bx_adapters::{MetricLabels, MetricsAdapter, ProcessAdapter, Step};
use bx_core::{
    classify, truncate_log_lines, ArchiveFormat, BlueprintIdentity, ExecutionRequest,
    ExecutionResult, PackageManifest, Settings, UploadResult,
};
use std::time::Instant;
use tracing::Instrument;

/// Adapter dependencies for the executor
pub struct ExecutorDeps<P, M> {
    pub process: P,
    pub metrics: M,
}

/// Handles upload, prepare and execute requests.
///
/// Every method returns a result value rather than an error: failures are
/// reported to the caller as `success = false` with a message and whatever
/// log was captured.
#[derive(Clone)]
pub struct Executor<P, M> {
    store: WorkspaceStore,
    locks: WorkspaceLocks,
    provisioner: Provisioner<P>,
    installer: Installer<P>,
    runner: Runner<P>,
    metrics: M,
    max_response_bytes: usize,
}

impl<P, M> Executor<P, M>
where
    P: ProcessAdapter,
    M: MetricsAdapter,
{
    pub fn new(settings: &Settings, deps: ExecutorDeps<P, M>) -> Self {
        let locks = WorkspaceLocks::new();
        let provisioner = Provisioner::new(deps.process.clone(), settings);
        Self {
            store: WorkspaceStore::new(&settings.deploy_dir),
            installer: Installer::new(deps.process.clone(), settings),
            runner: Runner::new(deps.process, provisioner.clone(), locks.clone()),
            provisioner,
            locks,
            metrics: deps.metrics,
            max_response_bytes: settings.max_response_bytes,
        }
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    /// Unpack an uploaded archive into the blueprint's workspace
    pub async fn upload(
        &self,
        identity: &BlueprintIdentity,
        format: ArchiveFormat,
        data: Vec<u8>,
    ) -> UploadResult {
        let span = tracing::info_span!("upload", blueprint = %identity, %format, bytes = data.len());
        let labels = MetricLabels::new(Step::Upload, identity);
        let start = Instant::now();

        let result = self.upload_inner(identity, format, data).instrument(span.clone()).await;

        let _guard = span.enter();
        match result {
            Ok(files) => {
                tracing::info!(files, elapsed_ms = start.elapsed().as_millis() as u64, "uploaded");
                self.metrics.observe_duration(&labels, start.elapsed());
                UploadResult::succeeded()
            }
            Err(e) => {
                tracing::error!(error = %e, "upload failed");
                self.metrics.increment_errors(&labels);
                UploadResult::failed(e.to_string())
            }
        }
    }

    async fn upload_inner(
        &self,
        identity: &BlueprintIdentity,
        format: ArchiveFormat,
        data: Vec<u8>,
    ) -> Result<usize, ExecutorError> {
        let ws = self.store.resolve(identity)?;
        let _guard = self.locks.acquire(ws.path()).await;
        let dest = ws.path().to_path_buf();
        tokio::task::spawn_blocking(move || upload::extract(format, &data, &dest))
            .await
            .map_err(|e| ExecutorError::Execution(format!("extraction task failed: {}", e)))?
    }

    /// Provision the sandbox and install `manifest`, unless already done
    pub async fn prepare(
        &self,
        identity: &BlueprintIdentity,
        manifest: &PackageManifest,
    ) -> ExecutionResult {
        let span = tracing::info_span!("prepare", blueprint = %identity);
        let labels = MetricLabels::new(Step::Prepare, identity);
        let start = Instant::now();
        let mut log = Vec::new();

        let result = self
            .prepare_inner(identity, manifest, &mut log)
            .instrument(span.clone())
            .await;

        let _guard = span.enter();
        self.truncate(&mut log);
        match result {
            Ok(()) => {
                tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "environment ready");
                self.metrics.observe_duration(&labels, start.elapsed());
                ExecutionResult::succeeded(log)
            }
            Err(ExecutorError::ReuploadRequired(message)) => {
                tracing::info!(reason = %message, "blueprint must be uploaded again");
                self.metrics.increment_errors(&labels);
                ExecutionResult::reupload(message)
            }
            Err(e) => {
                tracing::error!(error = %e, "prepare failed");
                self.metrics.increment_errors(&labels);
                ExecutionResult::failed(
                    format!("failed to prepare environment for {}: {}", identity.key(), e),
                    log,
                )
            }
        }
    }

    async fn prepare_inner(
        &self,
        identity: &BlueprintIdentity,
        manifest: &PackageManifest,
        log: &mut Vec<String>,
    ) -> Result<(), ExecutorError> {
        let ws = self.store.resolve(identity)?;
        let _guard = self.locks.acquire(ws.path()).await;

        match self.provisioner.ensure(&ws, log).await? {
            ProvisionOutcome::Cached { transcript } => {
                log.push(transcript);
            }
            ProvisionOutcome::Created => {
                self.installer.install(&ws, manifest, log).await?;
            }
        }
        Ok(())
    }

    /// Run one command in the blueprint's sandbox
    pub async fn execute(
        &self,
        identity: &BlueprintIdentity,
        request: &ExecutionRequest,
    ) -> ExecutionResult {
        let script = request.script_name();
        let span = tracing::info_span!("execute", blueprint = %identity, script = %script);
        let labels = MetricLabels::new(Step::Execute, identity).with_script(script.as_str());
        let start = Instant::now();

        let result = self.execute_inner(identity, request).instrument(span.clone()).await;

        let _guard = span.enter();
        let mut result = match result {
            Ok(outcome) => self.classify_outcome(identity, request, outcome),
            Err(ExecutorError::ReuploadRequired(message)) => ExecutionResult::reupload(message),
            Err(e) => ExecutionResult::failed(e.to_string(), Vec::new()),
        };
        self.truncate(&mut result.log_lines);

        if result.success {
            tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "command succeeded");
            self.metrics.observe_duration(&labels, start.elapsed());
        } else {
            tracing::warn!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                error = result.error_message.as_deref().unwrap_or_default(),
                "command failed"
            );
            self.metrics.increment_errors(&labels);
        }
        result
    }

    async fn execute_inner(
        &self,
        identity: &BlueprintIdentity,
        request: &ExecutionRequest,
    ) -> Result<RunOutcome, ExecutorError> {
        if request.timeout_secs == 0 {
            return Err(ExecutorError::Validation(
                "timeout must be at least one second".to_string(),
            ));
        }
        let ws = self.store.resolve(identity)?;
        self.runner.run(&ws, identity, request).await
    }

    fn classify_outcome(
        &self,
        identity: &BlueprintIdentity,
        request: &ExecutionRequest,
        outcome: RunOutcome,
    ) -> ExecutionResult {
        let output = outcome.output;
        let classified = classify(&output.stdout);

        let result = if output.timed_out {
            let timeout = ExecutorError::Timeout {
                secs: request.timeout_secs,
            };
            ExecutionResult::failed(
                format!("Running command {} failed: {}", identity.key(), timeout),
                classified.log_lines,
            )
        } else if output.success() {
            ExecutionResult::succeeded(classified.log_lines)
        } else {
            let message = classified.error_message.unwrap_or_else(|| match output.exit_code {
                Some(code) => format!("command exited with status {}", code),
                None => "command terminated by signal".to_string(),
            });
            ExecutionResult::failed(message, classified.log_lines)
        };
        result.with_payload(classified.payload)
    }

    fn truncate(&self, lines: &mut Vec<String>) {
        let removed = truncate_log_lines(lines, self.max_response_bytes);
        if removed > 0 {
            tracing::warn!(removed, "log truncated to fit response limit");
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
