// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by engine unit tests

use crate::workspace::{Workspace, WorkspaceStore, DESCRIPTOR_PATH};
use bx_core::{BlueprintIdentity, Settings};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub fn identity() -> BlueprintIdentity {
    BlueprintIdentity::new("vFW", "1.0.0", "a1b2").with_request("req-1", "sub-1")
}

pub fn settings(deploy: &Path) -> Settings {
    Settings::default()
        .with_deploy_dir(deploy)
        .with_utility_dir("/opt/bx_utils")
        .with_install_timeout(Duration::from_secs(30))
}

/// Workspace laid out as if a well-formed archive had been uploaded
pub fn uploaded(deploy: &Path) -> Workspace {
    let ws = WorkspaceStore::new(deploy).resolve(&identity()).unwrap();
    fs::create_dir_all(ws.path().join("TOSCA-Metadata")).unwrap();
    fs::write(ws.path().join(DESCRIPTOR_PATH), "TOSCA-Meta-File-Version: 1.0\n").unwrap();
    ws
}

/// Add the site-packages directory a real venv would have created
pub fn with_site_packages(ws: &Workspace) {
    fs::create_dir_all(ws.path().join("lib/python3.11/site-packages")).unwrap();
}

/// Zip archive holding `entries` as `(path, content)`
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
