// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bx_adapters::{
    LocalProcessAdapter, LogMetricsAdapter, MetricLabels, MetricsAdapter, NoOpMetricsAdapter,
    TracedProcessAdapter,
};
use bx_core::Settings;
use bx_engine::{Executor, ExecutorDeps};
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::server::ServerContext;

/// Metrics backend chosen at startup from settings
#[derive(Clone)]
pub enum DaemonMetrics {
    Disabled(NoOpMetricsAdapter),
    Log(LogMetricsAdapter),
}

impl DaemonMetrics {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.metrics.enabled {
            DaemonMetrics::Log(LogMetricsAdapter::new())
        } else {
            DaemonMetrics::Disabled(NoOpMetricsAdapter::new())
        }
    }
}

impl MetricsAdapter for DaemonMetrics {
    fn observe_duration(&self, labels: &MetricLabels, elapsed: Duration) {
        match self {
            DaemonMetrics::Disabled(m) => m.observe_duration(labels, elapsed),
            DaemonMetrics::Log(m) => m.observe_duration(labels, elapsed),
        }
    }

    fn increment_errors(&self, labels: &MetricLabels) {
        match self {
            DaemonMetrics::Disabled(m) => m.increment_errors(labels),
            DaemonMetrics::Log(m) => m.increment_errors(labels),
        }
    }
}

/// Executor with concrete adapter types (process runs wrapped with tracing)
pub type DaemonExecutor = Executor<TracedProcessAdapter<LocalProcessAdapter>, DaemonMetrics>;

/// Shared context handed to every connection task
pub type DaemonContext = ServerContext<TracedProcessAdapter<LocalProcessAdapter>, DaemonMetrics>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Executor settings
    pub settings: Settings,
}

impl Config {
    /// Resolve paths and settings from the environment
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = state_dir()?;
        Ok(Self::in_dirs(state_dir, socket_dir(), Settings::from_env()))
    }

    /// Lay out daemon files under explicit directories
    pub fn in_dirs(state_dir: PathBuf, socket_dir: PathBuf, settings: Settings) -> Self {
        Self {
            socket_path: socket_dir.join("bxd.sock"),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            settings,
        }
    }
}

/// Daemon state during operation
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    /// Executor and counters shared with connection tasks
    pub ctx: Arc<DaemonContext>,
}

impl DaemonState {
    /// Shutdown the daemon gracefully
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        for (what, path) in [
            ("socket", &self.config.socket_path),
            ("PID", &self.config.lock_path),
            ("version", &self.config.version_path),
        ] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!("Failed to remove {} file: {}", what, e);
                }
            }
        }

        // Lock is released when self.lock_file is dropped
        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Deploy directory {0} is unusable: {1}")]
    DeployDir(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // Clean up any resources created before failure
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create state and socket directories
    for path in [&config.lock_path, &config.socket_path] {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // 2. Acquire lock file FIRST - prevents races
    let lock_file = File::create(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    use std::io::Write;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // 3. Deploy root must exist before any request resolves a workspace
    let settings = &config.settings;
    std::fs::create_dir_all(&settings.deploy_dir)
        .map_err(|e| LifecycleError::DeployDir(settings.deploy_dir.clone(), e))?;
    if !settings.utility_dir.is_dir() {
        warn!(
            utility_dir = %settings.utility_dir.display(),
            "utility package directory not found, prepare requests will fail"
        );
    }

    // 4. Set up adapters (wrapped with tracing for observability)
    let executor: DaemonExecutor = Executor::new(
        settings,
        ExecutorDeps {
            process: TracedProcessAdapter::new(LocalProcessAdapter::new()),
            metrics: DaemonMetrics::from_settings(settings),
        },
    );

    // 5. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(
        deploy_dir = %settings.deploy_dir.display(),
        metrics = settings.metrics.enabled,
        metrics_port = ?settings.metrics.port,
        "Daemon started"
    );

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        ctx: Arc::new(ServerContext::new(executor)),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    for path in [
        &config.socket_path,
        &config.version_path,
        &config.lock_path,
    ] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Get the state directory for bx
///
/// BX_STATE_DIR overrides XDG_STATE_HOME, which overrides ~/.local/state.
fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("BX_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("bx"));
    }

    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/bx"))
}

/// Get the socket directory for bx
///
/// Uses /tmp/bx by default to keep paths short (macOS SUN_LEN = 104).
/// Can be overridden with BX_SOCKET_DIR for testing.
fn socket_dir() -> PathBuf {
    match std::env::var("BX_SOCKET_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => PathBuf::from("/tmp/bx"),
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
