// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tempfile::TempDir;

fn identity() -> BlueprintIdentity {
    BlueprintIdentity::new("vFW", "1.0.0", "4f6e")
}

#[test]
fn resolve_builds_name_version_uuid_path() {
    let root = TempDir::new().unwrap();
    let store = WorkspaceStore::new(root.path());

    let ws = store.resolve(&identity()).unwrap();

    assert_eq!(ws.path(), root.path().join("vFW").join("1.0.0").join("4f6e"));
    assert!(!ws.exists());
    assert!(!ws.has_descriptor());
}

#[test]
fn resolve_rejects_traversal() {
    let store = WorkspaceStore::new("/deploy");
    let bad = BlueprintIdentity::new("..", "1.0.0", "u");

    let err = store.resolve(&bad).unwrap_err();
    assert!(matches!(err, ExecutorError::Validation(_)), "{err}");
}

#[test]
fn different_uuids_never_share_a_directory() {
    let store = WorkspaceStore::new("/deploy");
    let a = store.resolve(&BlueprintIdentity::new("n", "v", "a")).unwrap();
    let b = store.resolve(&BlueprintIdentity::new("n", "v", "b")).unwrap();
    assert_ne!(a.path(), b.path());
}

#[test]
fn descriptor_detection() {
    let root = TempDir::new().unwrap();
    let ws = Workspace::new(root.path());
    assert!(ws.exists());
    assert!(!ws.has_descriptor());

    fs::create_dir_all(root.path().join("TOSCA-Metadata")).unwrap();
    fs::write(root.path().join(DESCRIPTOR_PATH), "TOSCA-Meta-File-Version: 1.0").unwrap();
    assert!(ws.has_descriptor());
}

#[test]
fn marker_write_read_remove() {
    let root = TempDir::new().unwrap();
    let ws = Workspace::new(root.path());

    assert_eq!(ws.read_marker().unwrap(), None);

    ws.write_marker("Installed pip packages:\n   requests\n").unwrap();
    assert!(ws.has_marker());
    assert_eq!(
        ws.read_marker().unwrap().as_deref(),
        Some("Installed pip packages:\n   requests\n")
    );
    assert!(!root.path().join(".installed.tmp").exists());

    ws.remove_marker().unwrap();
    assert!(!ws.has_marker());
    // Removing twice is not an error
    ws.remove_marker().unwrap();
}

#[test]
fn touch_refreshes_mtime() {
    let root = TempDir::new().unwrap();
    let ws = Workspace::new(root.path());
    let old = SystemTime::now() - Duration::from_secs(3600);
    fs::File::open(root.path()).unwrap().set_modified(old).unwrap();

    ws.touch().unwrap();

    let mtime = fs::metadata(root.path()).unwrap().modified().unwrap();
    assert!(mtime > old + Duration::from_secs(1800));
}

#[test]
fn touch_missing_directory_fails() {
    let ws = Workspace::new("/nonexistent/bx/workspace");
    assert!(ws.touch().is_err());
}
