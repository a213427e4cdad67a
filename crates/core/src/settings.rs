// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime settings read from the environment

use std::path::PathBuf;
use std::time::Duration;

pub const DEPLOY_DIR: &str = "BX_DEPLOY_DIR";
pub const PYTHON: &str = "BX_PYTHON";
pub const UTILITY_DIR: &str = "BX_UTILITY_DIR";
pub const DISABLE_SITE_PACKAGES: &str = "BX_DISABLE_SITE_PACKAGES";
pub const PIP_INSTALL_USER: &str = "BX_PIP_INSTALL_USER";
pub const INSTALL_TIMEOUT_SECS: &str = "BX_INSTALL_TIMEOUT_SECS";
pub const MAX_RESPONSE_BYTES: &str = "BX_MAX_RESPONSE_BYTES";
pub const METRICS_ENABLED: &str = "BX_METRICS_ENABLED";
pub const METRICS_PORT: &str = "BX_METRICS_PORT";
pub const HTTP_PROXY: &str = "http_proxy";
pub const HTTPS_PROXY: &str = "https_proxy";

const DEFAULT_DEPLOY_DIR: &str = "/opt/app/bx/blueprints/deploy";
const DEFAULT_UTILITY_DIR: &str = "./bx_utils";
const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(900);
const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Metrics switch; the exporter itself lives outside the executor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub port: Option<u16>,
}

/// Executor settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root under which `name/version/uuid` workspaces live
    pub deploy_dir: PathBuf,
    /// Interpreter used to create sandboxes
    pub python: PathBuf,
    /// Utility package copied into every sandbox before other installs
    pub utility_dir: PathBuf,
    /// Create sandboxes without the interpreter's site packages
    pub disable_site_packages: bool,
    /// Pass `--user` to pip installs
    pub pip_install_user: bool,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    /// Bound on each individual install process
    pub install_timeout: Duration,
    /// Bound on the log returned for one request
    pub max_response_bytes: usize,
    pub metrics: MetricsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deploy_dir: PathBuf::from(DEFAULT_DEPLOY_DIR),
            python: PathBuf::from("python3"),
            utility_dir: PathBuf::from(DEFAULT_UTILITY_DIR),
            disable_site_packages: false,
            pip_install_user: false,
            http_proxy: None,
            https_proxy: None,
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            metrics: MetricsSettings::default(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup.
    ///
    /// Switches are enabled by presence alone. Unparseable numbers fall back to
    /// their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            deploy_dir: non_empty(DEPLOY_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.deploy_dir),
            python: non_empty(PYTHON)
                .map(PathBuf::from)
                .unwrap_or(defaults.python),
            utility_dir: non_empty(UTILITY_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.utility_dir),
            disable_site_packages: lookup(DISABLE_SITE_PACKAGES).is_some(),
            pip_install_user: lookup(PIP_INSTALL_USER).is_some(),
            http_proxy: non_empty(HTTP_PROXY),
            https_proxy: non_empty(HTTPS_PROXY),
            install_timeout: parse_number(&lookup, INSTALL_TIMEOUT_SECS)
                .map(Duration::from_secs)
                .unwrap_or(defaults.install_timeout),
            max_response_bytes: parse_number(&lookup, MAX_RESPONSE_BYTES)
                .unwrap_or(defaults.max_response_bytes),
            metrics: MetricsSettings {
                enabled: lookup(METRICS_ENABLED).is_some(),
                port: parse_number(&lookup, METRICS_PORT),
            },
        }
    }

    pub fn with_deploy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.deploy_dir = dir.into();
        self
    }

    pub fn with_utility_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.utility_dir = dir.into();
        self
    }

    pub fn with_install_timeout(mut self, timeout: Duration) -> Self {
        self.install_timeout = timeout;
        self
    }
}

fn parse_number<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
