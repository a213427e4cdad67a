// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bx prepare`: provision a blueprint's sandbox and install packages

use std::path::PathBuf;

use anyhow::{Context, Result};
use bx_core::{PackageKind, PackageManifest};

use super::blueprint::BlueprintArgs;
use crate::client::DaemonClient;
use crate::output::{self, ExecutionReport, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub blueprint: BlueprintArgs,

    /// Python packages to install with pip (`requirements.txt` installs the
    /// blueprint's own requirements file)
    #[arg(long = "pip", value_delimiter = ',')]
    pub pip: Vec<String>,

    /// Ansible roles to install with ansible-galaxy
    #[arg(long = "galaxy", value_delimiter = ',')]
    pub galaxy: Vec<String>,

    /// JSON manifest file: [{"kind": "pip", "packages": [...]}, ...]
    #[arg(long, conflicts_with_all = ["pip", "galaxy"])]
    pub manifest: Option<PathBuf>,
}

impl PrepareArgs {
    pub fn manifest(&self) -> Result<PackageManifest> {
        if let Some(path) = &self.manifest {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading manifest {}", path.display()))?;
            return serde_json::from_str(&raw)
                .with_context(|| format!("parsing manifest {}", path.display()));
        }

        let mut manifest = PackageManifest::new();
        if !self.pip.is_empty() {
            manifest = manifest.with(PackageKind::Pip, self.pip.iter().cloned());
        }
        if !self.galaxy.is_empty() {
            manifest = manifest.with(PackageKind::AnsibleGalaxy, self.galaxy.iter().cloned());
        }
        Ok(manifest)
    }
}

/// Returns whether the sandbox is ready
pub async fn handle(args: PrepareArgs, client: &DaemonClient, format: OutputFormat) -> Result<bool> {
    let manifest = args.manifest()?;
    let identity = args.blueprint.identity();
    tracing::debug!(blueprint = %identity, entries = manifest.entries().len(), "preparing");

    let result = client.prepare(identity, manifest).await?;
    output::print(&ExecutionReport(&result), format);
    Ok(result.success)
}
