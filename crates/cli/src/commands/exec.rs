// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bx exec`: run a command in a blueprint's sandbox

use anyhow::{Context, Result};
use bx_core::ExecutionRequest;

use super::blueprint::BlueprintArgs;
use crate::client::DaemonClient;
use crate::output::{self, ExecutionReport, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub blueprint: BlueprintArgs,

    /// Seconds before the command is killed
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// JSON object passed to the script as its last argument
    #[arg(long)]
    pub properties: Option<String>,

    #[arg(long)]
    pub originator_id: Option<String>,

    #[arg(long)]
    pub correlation_id: Option<String>,

    /// Command line, relative to the blueprint root
    #[arg(trailing_var_arg = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

impl ExecArgs {
    pub fn request(&self) -> Result<ExecutionRequest> {
        let mut request = ExecutionRequest::new(self.command.join(" "), self.timeout);
        if let Some(raw) = &self.properties {
            let properties = serde_json::from_str(raw).context("--properties must be JSON")?;
            request = request.with_properties(properties);
        }
        request.originator_id = self.originator_id.clone();
        request.correlation_id = self.correlation_id.clone();
        Ok(request)
    }
}

/// Returns whether the command succeeded
pub async fn handle(args: ExecArgs, client: &DaemonClient, format: OutputFormat) -> Result<bool> {
    let request = args.request()?;
    let identity = args.blueprint.identity();
    tracing::debug!(blueprint = %identity, command = %request.command, "executing");

    let result = client.execute(identity, request).await?;
    output::print(&ExecutionReport(&result), format);
    Ok(result.success)
}
