// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bx daemon`: start, stop and inspect bxd

use std::fmt;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::client::{self, DaemonClient, DaemonPaths};
use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Start the daemon
    Start {
        /// Run in the foreground instead of detaching
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon
    Stop,
    /// Show daemon status
    Status,
    /// Show the end of the daemon log
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value_t = 50)]
        lines: usize,
    },
}

#[derive(Debug, Serialize)]
struct DaemonStatus {
    running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uptime_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    requests_active: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

impl fmt::Display for DaemonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.running {
            return writeln!(f, "Daemon not running");
        }
        writeln!(f, "Daemon running")?;
        if let Some(pid) = self.pid {
            writeln!(f, "  PID: {}", pid)?;
        }
        if let Some(version) = &self.version {
            writeln!(f, "  Version: {}", version)?;
        }
        if let Some(uptime) = self.uptime_secs {
            writeln!(f, "  Uptime: {}s", uptime)?;
        }
        if let Some(active) = self.requests_active {
            writeln!(f, "  Active requests: {}", active)?;
        }
        Ok(())
    }
}

pub async fn handle(args: DaemonArgs, paths: &DaemonPaths, format: OutputFormat) -> Result<()> {
    match args.command {
        DaemonCommand::Start { foreground: true } => {
            let status = std::process::Command::new(client::find_bxd_binary())
                .status()
                .context("running bxd")?;
            if !status.success() {
                anyhow::bail!("bxd exited with {}", status);
            }
        }
        DaemonCommand::Start { foreground: false } => {
            if DaemonClient::connect(paths).is_ok() {
                println!("Daemon already running");
                return Ok(());
            }
            DaemonClient::connect_or_start(paths).await?;
            println!("Daemon started");
        }
        DaemonCommand::Stop => {
            if client::daemon_stop(paths).await? {
                println!("Daemon stopped");
            } else {
                println!("Daemon not running");
            }
        }
        DaemonCommand::Status => {
            let status = match DaemonClient::connect(paths) {
                Ok(client) => {
                    let (uptime_secs, requests_active, version) = client.status().await?;
                    DaemonStatus {
                        running: true,
                        pid: client::read_daemon_pid(paths),
                        uptime_secs: Some(uptime_secs),
                        requests_active: Some(requests_active),
                        version: Some(version),
                    }
                }
                Err(client::ClientError::DaemonNotRunning) => DaemonStatus {
                    running: false,
                    pid: None,
                    uptime_secs: None,
                    requests_active: None,
                    version: None,
                },
                Err(e) => return Err(e.into()),
            };
            output::print(&status, format);
        }
        DaemonCommand::Logs { lines } => {
            let log_path = paths.log_path();
            let content = match std::fs::read_to_string(&log_path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    println!("No daemon log at {}", log_path.display());
                    return Ok(());
                }
                Err(e) => return Err(e).context(format!("reading {}", log_path.display())),
            };
            let all: Vec<&str> = content.lines().collect();
            for line in &all[all.len().saturating_sub(lines)..] {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
