// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the executor

use bx_core::IdentityError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that can stop an upload, prepare or execute request
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("{0}")]
    Validation(String),
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    ReuploadRequired(String),
    #[error("sandbox provisioning failed: {0}")]
    Provisioning(String),
    #[error("failed to install {package}: {detail}")]
    Install { package: String, detail: String },
    #[error("timeout of {secs} seconds exceeded")]
    Timeout { secs: u64 },
    #[error("{0}")]
    Execution(String),
}

impl ExecutorError {
    pub(crate) fn fs(path: &Path, source: io::Error) -> Self {
        ExecutorError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True when the caller should upload the archive again before retrying
    pub fn needs_reupload(&self) -> bool {
        matches!(self, ExecutorError::ReuploadRequired(_))
    }
}

impl From<IdentityError> for ExecutorError {
    fn from(e: IdentityError) -> Self {
        ExecutorError::Validation(e.to_string())
    }
}
