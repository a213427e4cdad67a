// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request and result values exchanged with callers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Archive format of an uploaded blueprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    Zip,
    Gzip,
}

impl FromStr for ArchiveFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zip" | "archive_zip" => Ok(ArchiveFormat::Zip),
            "gzip" | "archive_gzip" => Ok(ArchiveFormat::Gzip),
            _ => Err(format!("Archive type {} is not valid.", s)),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveFormat::Zip => f.write_str("zip"),
            ArchiveFormat::Gzip => f.write_str("gzip"),
        }
    }
}

/// A command to run inside a blueprint's sandbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originator_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl ExecutionRequest {
    pub fn new(command: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            command: command.into(),
            properties: None,
            timeout_secs,
            originator_id: None,
            correlation_id: None,
        }
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Script name used to label metrics: the basename of the second word
    /// (`python <script> ...`), or the first word for bare commands.
    pub fn script_name(&self) -> String {
        let mut words = self.command.split_whitespace();
        let first = words.next().unwrap_or_default();
        let target = words.next().unwrap_or(first);
        target.rsplit('/').next().unwrap_or(target).to_string()
    }
}

/// Outcome of a prepare or execute request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default)]
    pub log_lines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reupload_required: Option<bool>,
}

impl ExecutionResult {
    pub fn succeeded(log_lines: Vec<String>) -> Self {
        Self {
            success: true,
            log_lines,
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>, log_lines: Vec<String>) -> Self {
        Self {
            success: false,
            log_lines,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Failure telling the caller to send the archive again
    pub fn reupload(message: impl Into<String>) -> Self {
        Self {
            reupload_required: Some(true),
            ..Self::failed(message, Vec::new())
        }
    }

    pub fn with_payload(mut self, payload: Option<serde_json::Value>) -> Self {
        self.payload = payload;
        self
    }
}

/// Outcome of an upload request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    #[serde(default)]
    pub error_messages: Vec<String>,
}

impl UploadResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error_messages: Vec::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_messages: vec![message.into()],
        }
    }
}
