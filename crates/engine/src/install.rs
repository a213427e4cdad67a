// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Package installation into a provisioned sandbox

use crate::error::ExecutorError;
use crate::provision::{collect_output, failure_detail};
use crate::workspace::Workspace;
use bx_adapters::{CommandSpec, ProcessAdapter};
use bx_core::{PackageKind, PackageManifest, Settings, REQUIREMENTS_TXT};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Package name reported when copying the utility package fails
pub const UTILITY_PACKAGE: &str = "utility";

/// Installs the utility package and a manifest, then records the marker.
///
/// Any failure removes the marker so the next prepare starts over.
#[derive(Clone)]
pub struct Installer<P> {
    process: P,
    utility_dir: PathBuf,
    pip_install_user: bool,
    http_proxy: Option<String>,
    https_proxy: Option<String>,
    timeout: Duration,
}

impl<P: ProcessAdapter> Installer<P> {
    pub fn new(process: P, settings: &Settings) -> Self {
        Self {
            process,
            utility_dir: settings.utility_dir.clone(),
            pip_install_user: settings.pip_install_user,
            http_proxy: settings.http_proxy.clone(),
            https_proxy: settings.https_proxy.clone(),
            timeout: settings.install_timeout,
        }
    }

    /// Install everything and persist the marker. Returns the transcript
    /// stored in it; process output is appended to `log`.
    pub async fn install(
        &self,
        ws: &Workspace,
        manifest: &PackageManifest,
        log: &mut Vec<String>,
    ) -> Result<String, ExecutorError> {
        let result = match self.install_all(ws, manifest, log).await {
            Ok(transcript) => ws.write_marker(&transcript).map(|()| transcript),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::error!(workspace = %ws.path().display(), error = %e, "install failed, rolling back");
            if let Err(rm) = ws.remove_marker() {
                tracing::warn!(error = %rm, "could not remove marker");
            }
        }
        result
    }

    async fn install_all(
        &self,
        ws: &Workspace,
        manifest: &PackageManifest,
        log: &mut Vec<String>,
    ) -> Result<String, ExecutorError> {
        self.install_utility(ws, log).await?;

        let mut transcript = String::new();
        for entry in manifest.install_order() {
            transcript.push_str(&format!("Installed {} packages:\n", entry.kind));
            for package in &entry.packages {
                transcript.push_str(&format!("   {}\n", package));
                let spec = match entry.kind {
                    PackageKind::Pip => self.pip_command(ws, package),
                    PackageKind::AnsibleGalaxy => self.galaxy_command(ws, package),
                };
                tracing::info!(kind = %entry.kind, package = %package, "installing");
                self.run_install(&spec, package, log).await?;
            }
        }
        Ok(transcript)
    }

    /// Copy the utility package into the sandbox's site-packages
    async fn install_utility(&self, ws: &Workspace, log: &mut Vec<String>) -> Result<(), ExecutorError> {
        let site_packages = site_packages(ws.path()).ok_or_else(|| ExecutorError::Install {
            package: UTILITY_PACKAGE.to_string(),
            detail: format!("no lib/python*/site-packages in {}", ws.path().display()),
        })?;
        let spec = CommandSpec::new("cp").args([
            "-r".to_string(),
            self.utility_dir.display().to_string(),
            format!("{}/", site_packages.display()),
        ]);
        self.run_install(&spec, UTILITY_PACKAGE, log).await
    }

    fn pip_command(&self, ws: &Workspace, package: &str) -> CommandSpec {
        let mut spec = CommandSpec::new(ws.bin("pip").display().to_string()).arg("install");
        if self.pip_install_user {
            spec = spec.arg("--user");
        }
        spec = if package == REQUIREMENTS_TXT {
            let requirements = ws.path().join("Environments").join(REQUIREMENTS_TXT);
            spec.arg("-r").arg(requirements.display().to_string())
        } else {
            spec.arg(package)
        };
        if let Some(proxy) = &self.https_proxy {
            spec = spec.env("https_proxy", proxy);
        }
        spec
    }

    fn galaxy_command(&self, ws: &Workspace, package: &str) -> CommandSpec {
        let roles = ws.path().join("Scripts").join("ansible").join("roles");
        let mut spec = CommandSpec::new("ansible-galaxy")
            .args(["install", package, "-p"])
            .arg(roles.display().to_string());
        // The role installer reads the plain-HTTP proxy from https_proxy
        if let Some(proxy) = &self.http_proxy {
            spec = spec.env("https_proxy", proxy);
        }
        spec
    }

    async fn run_install(
        &self,
        spec: &CommandSpec,
        package: &str,
        log: &mut Vec<String>,
    ) -> Result<(), ExecutorError> {
        let install_err = |detail: String| ExecutorError::Install {
            package: package.to_string(),
            detail,
        };
        let output = self
            .process
            .run(spec, Some(self.timeout))
            .await
            .map_err(|e| install_err(e.to_string()))?;
        collect_output(&output, log);
        match failure_detail(&output, self.timeout) {
            Some(detail) => Err(install_err(detail)),
            None => Ok(()),
        }
    }
}

/// First `lib/python*/site-packages` directory in the sandbox
fn site_packages(root: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(root.join("lib"))
        .ok()?
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("python"))
        .map(|e| e.path().join("site-packages"))
        .filter(|p| p.is_dir())
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
