// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bx - Blueprint executor CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{daemon, exec, prepare, upload};
use tracing_subscriber::EnvFilter;

use crate::client::{DaemonClient, DaemonPaths};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "bx",
    version,
    about = "Blueprint executor - upload, prepare and run blueprint scripts"
)]
struct Cli {
    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a blueprint archive
    Upload(upload::UploadArgs),
    /// Create the blueprint's sandbox and install its packages
    Prepare(prepare::PrepareArgs),
    /// Run a command in the blueprint's sandbox
    Exec(exec::ExecArgs),
    /// Daemon management
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("BX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let paths = DaemonPaths::from_env()?;

    let succeeded = match cli.command {
        // Daemon management doesn't need a client connection
        Commands::Daemon(args) => {
            daemon::handle(args, &paths, cli.output).await?;
            true
        }
        Commands::Upload(args) => {
            let client = DaemonClient::connect_or_start(&paths).await?;
            upload::handle(args, &client, cli.output).await?
        }
        Commands::Prepare(args) => {
            let client = DaemonClient::connect_or_start(&paths).await?;
            prepare::handle(args, &client, cli.output).await?
        }
        Commands::Exec(args) => {
            let client = DaemonClient::connect_or_start(&paths).await?;
            exec::handle(args, &client, cli.output).await?
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
