// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-workspace serialization of provisioning

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// Async mutexes keyed by workspace path.
///
/// Holding the guard makes "check marker, provision, install, write marker"
/// atomic with respect to other requests for the same workspace. Requests
/// for other workspaces are unaffected.
#[derive(Clone, Default)]
pub struct WorkspaceLocks {
    locks: Arc<Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>>,
}

impl WorkspaceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `path`
    pub async fn acquire(&self, path: &Path) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Drop entries nobody holds or waits on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(path.to_path_buf()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of workspaces with a live lock entry
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn same_path_is_exclusive() {
        let locks = WorkspaceLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let locks = locks.clone();
            let inside = inside.clone();
            let peak = peak.clone();
            tasks.push(tokio::spawn(async move {
                let _guard = locks.acquire(Path::new("/deploy/a/1/u")).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_paths_do_not_block() {
        let locks = WorkspaceLocks::new();
        let _a = locks.acquire(Path::new("/deploy/a/1/u")).await;

        let b = tokio::time::timeout(
            Duration::from_millis(200),
            locks.acquire(Path::new("/deploy/b/1/u")),
        )
        .await;

        assert!(b.is_ok(), "other workspace must not wait");
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = WorkspaceLocks::new();
        drop(locks.acquire(Path::new("/deploy/a/1/u")).await);
        drop(locks.acquire(Path::new("/deploy/b/1/u")).await);

        // The second acquire pruned the first entry
        assert_eq!(locks.len(), 1);
    }
}
