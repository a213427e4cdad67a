// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace directories for uploaded blueprints
//!
//! Each blueprint instance owns `<deploy_dir>/<name>/<version>/<uuid>`. The
//! archive is unpacked there and the sandbox is created in place, so the
//! directory doubles as the virtualenv root (`bin/`, `lib/`).

use crate::error::ExecutorError;
use bx_core::BlueprintIdentity;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Presence of this file means provisioning and installs completed
pub const MARKER_FILE: &str = ".installed";

/// Written by every well-formed archive
pub const DESCRIPTOR_PATH: &str = "TOSCA-Metadata/TOSCA.meta";

/// Maps identities to workspace directories under one root
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    root: PathBuf,
}

impl WorkspaceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the workspace for `identity`; rejects identities that are not
    /// plain path components.
    pub fn resolve(&self, identity: &BlueprintIdentity) -> Result<Workspace, ExecutorError> {
        identity.validate()?;
        Ok(Workspace::new(self.root.join(identity.relative_path())))
    }
}

/// One blueprint's directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// The archive was unpacked completely enough to carry its descriptor
    pub fn has_descriptor(&self) -> bool {
        self.path.join(DESCRIPTOR_PATH).is_file()
    }

    pub fn marker_path(&self) -> PathBuf {
        self.path.join(MARKER_FILE)
    }

    pub fn has_marker(&self) -> bool {
        self.marker_path().is_file()
    }

    /// Executable inside the sandbox's `bin/`
    pub fn bin(&self, name: &str) -> PathBuf {
        self.path.join("bin").join(name)
    }

    /// Install transcript stored in the marker, if present
    pub fn read_marker(&self) -> Result<Option<String>, ExecutorError> {
        let path = self.marker_path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ExecutorError::fs(&path, e)),
        }
    }

    /// Persist the marker atomically (temp file + rename)
    pub fn write_marker(&self, transcript: &str) -> Result<(), ExecutorError> {
        let path = self.marker_path();
        let tmp = self.path.join(format!("{}.tmp", MARKER_FILE));
        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(transcript.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            ExecutorError::fs(&path, e)
        })
    }

    /// Remove the marker; a missing marker is fine
    pub fn remove_marker(&self) -> Result<(), ExecutorError> {
        let path = self.marker_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ExecutorError::fs(&path, e)),
        }
    }

    /// Bump the directory's modification time to mark it recently used
    pub fn touch(&self) -> io::Result<()> {
        fs::File::open(&self.path)?.set_modified(SystemTime::now())
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
