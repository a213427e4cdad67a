// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use std::fmt;

use bx_core::{ExecutionResult, UploadResult};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => print!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Text view of an upload result
#[derive(Serialize)]
#[serde(transparent)]
pub struct UploadReport<'a>(pub &'a UploadResult);

impl fmt::Display for UploadReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.success {
            return writeln!(f, "uploaded");
        }
        for message in &self.0.error_messages {
            writeln!(f, "error: {}", message)?;
        }
        Ok(())
    }
}

/// Text view of a prepare or execute result: the log, then any payload,
/// then the failure.
#[derive(Serialize)]
#[serde(transparent)]
pub struct ExecutionReport<'a>(pub &'a ExecutionResult);

impl fmt::Display for ExecutionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        for line in &result.log_lines {
            writeln!(f, "{}", line)?;
        }
        if let Some(payload) = &result.payload {
            writeln!(f, "payload: {}", payload)?;
        }
        if let Some(message) = &result.error_message {
            writeln!(f, "error: {}", message)?;
        }
        if result.reupload_required == Some(true) {
            writeln!(f, "blueprint must be uploaded again")?;
        }
        Ok(())
    }
}
