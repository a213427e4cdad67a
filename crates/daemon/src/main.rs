// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bxd: owns blueprint workspaces and runs their scripts for the `bx` CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;
mod server;

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing_appender::non_blocking::WorkerGuard;

use crate::lifecycle::{Config, DaemonContext, LifecycleError};

/// First line of every start attempt in the log; the CLI scans from the
/// last one when reporting why a start failed.
pub const STARTUP_MARKER_PREFIX: &str = "--- bxd: starting (pid: ";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let pid = std::process::id();

    append_to_log(&config, &format!("{}{}) ---", STARTUP_MARKER_PREFIX, pid))?;
    let _log_guard = init_tracing(&config)?;
    tracing::info!(pid, socket = %config.socket_path.display(), "bxd starting");

    let mut daemon = match lifecycle::startup(&config).await {
        Ok(daemon) => daemon,
        Err(e) => {
            // The appender may not flush before exit
            let _ = append_to_log(&config, &format!("ERROR Failed to start daemon: {}", e));
            tracing::error!(error = %e, "startup failed");
            return Err(e.into());
        }
    };

    tracing::info!("Daemon ready");
    println!("READY");

    let reason = serve(&daemon.listener, &daemon.ctx).await?;
    tracing::info!(reason, "stopping");

    let abandoned = daemon.ctx.requests_active();
    if abandoned > 0 {
        tracing::warn!(abandoned, "requests still running at shutdown");
    }
    daemon.shutdown()?;

    tracing::info!("Daemon stopped");
    Ok(())
}

/// Accept connections until a shutdown request or signal arrives. Each
/// connection runs on its own task since executions can take minutes.
async fn serve(
    listener: &UnixListener,
    ctx: &Arc<DaemonContext>,
) -> std::io::Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(ctx);
                    tokio::spawn(async move {
                        if let Err(e) = server::handle_connection(&*ctx, stream).await {
                            tracing::warn!(error = %e, "connection failed");
                        }
                    });
                }
                Err(e) => tracing::error!(error = %e, "accept failed"),
            },
            _ = ctx.shutdown.notified() => return Ok("shutdown request"),
            _ = sigterm.recv() => return Ok("SIGTERM"),
            _ = sigint.recv() => return Ok("SIGINT"),
        }
    }
}

/// Synchronous append, usable before tracing is up and after it fails
fn append_to_log(config: &Config, line: &str) -> Result<(), LifecycleError> {
    if let Some(dir) = config.log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// `RUST_LOG` filter (default `info`) into a non-blocking writer on the
/// daemon log
fn init_tracing(config: &Config) -> Result<WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = config.log_path.parent().ok_or(LifecycleError::NoStateDir)?;
    let file = config.log_path.file_name().ok_or(LifecycleError::NoStateDir)?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}
