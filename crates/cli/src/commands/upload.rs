// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bx upload`: send a blueprint archive to the daemon

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::blueprint::BlueprintArgs;
use crate::client::DaemonClient;
use crate::output::{self, OutputFormat, UploadReport};

#[derive(clap::Args, Debug)]
pub struct UploadArgs {
    #[command(flatten)]
    pub blueprint: BlueprintArgs,

    /// Archive format: zip or gzip (validated by the daemon)
    #[arg(long, default_value = "zip")]
    pub format: String,

    /// Path to the archive
    pub archive: PathBuf,
}

/// Returns whether the upload succeeded
pub async fn handle(args: UploadArgs, client: &DaemonClient, format: OutputFormat) -> Result<bool> {
    let bytes = std::fs::read(&args.archive)
        .with_context(|| format!("reading archive {}", args.archive.display()))?;
    let identity = args.blueprint.identity();
    tracing::debug!(blueprint = %identity, bytes = bytes.len(), "uploading");

    let result = client.upload(identity, &args.format, &bytes).await?;
    output::print(&UploadReport(&result), format);
    Ok(result.success)
}
