// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-container mutual exclusion for restart and update.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

/// Named async locks, one per container name.
///
/// Cloning shares the table. Entries are created on first use and kept for
/// the life of the process; the set of configured containers is small.
#[derive(Debug, Clone, Default)]
pub struct ContainerLocks {
    inner: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl ContainerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `name`.
    pub async fn acquire(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.inner.lock();
            Arc::clone(table.entry(name.to_string()).or_default())
        };
        if let Ok(guard) = Arc::clone(&lock).try_lock_owned() {
            return guard;
        }
        tracing::info!(container = name, "waiting for in-flight docker operation");
        lock.lock_owned().await
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
