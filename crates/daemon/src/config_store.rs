// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live configuration.
//!
//! [`ConfigStore`] holds the current [`Config`] behind an atomic pointer:
//! readers take a snapshot and keep it for the whole request, reloads swap
//! in a new one. [`watch`] drives reloads from filesystem events, collapsing
//! bursts through a [`Debouncer`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tada_core::{Config, ConfigError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub struct ConfigStore {
    path: PathBuf,
    current: ArcSwap<Config>,
}

impl ConfigStore {
    /// Load `path`. Failure here is fatal to the caller; there is no
    /// previous config to fall back on.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = Config::load(&path)?;
        Ok(Self { path, current: ArcSwap::from_pointee(config) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current config. Never torn: a reload replaces the whole value.
    pub fn snapshot(&self) -> Arc<Config> {
        self.current.load_full()
    }

    /// Re-read the file. On failure the current config stays in place.
    pub fn reload(&self) -> Result<Arc<Config>, ConfigError> {
        let config = Arc::new(Config::load(&self.path)?);
        self.current.store(Arc::clone(&config));
        Ok(config)
    }
}

/// Debounce state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    PendingReload { deadline: Instant },
}

/// Collapses change notifications arriving within `window` of each other
/// into one reload, fired once the file has been quiet for `window`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, state: DebounceState::Idle }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Record a change at `now`, pushing any pending deadline out.
    pub fn notify(&mut self, now: Instant) {
        self.state = DebounceState::PendingReload { deadline: now + self.window };
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Idle => None,
            DebounceState::PendingReload { deadline } => Some(deadline),
        }
    }

    /// Returns true (and goes idle) when a pending reload is due at `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.state {
            DebounceState::PendingReload { deadline } if now >= deadline => {
                self.state = DebounceState::Idle;
                true
            }
            _ => false,
        }
    }
}

/// Call `on_change` with the current config, then again after every
/// successful reload, until `cancel` fires.
///
/// The parent directory is watched rather than the file so that editors and
/// deploy tools that replace the file by rename are still seen.
pub fn watch<F>(
    store: Arc<ConfigStore>,
    window: Duration,
    cancel: CancellationToken,
    on_change: F,
) -> Result<JoinHandle<()>, notify::Error>
where
    F: Fn(Arc<Config>) + Send + 'static,
{
    on_change(store.snapshot());

    let (tx, rx) = mpsc::channel(16);
    let file_name = store.path().file_name().map(|n| n.to_os_string());
    let mut watcher = notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
        let Ok(event) = res else { return };
        if matches!(event.kind, EventKind::Access(_)) {
            return;
        }
        let ours = event.paths.iter().any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
        if ours {
            // Full channel means a reload is already queued.
            let _ = tx.try_send(());
        }
    })?;
    let dir = match store.path().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    tracing::info!(path = %store.path().display(), window_ms = window.as_millis() as u64, "watching config");

    Ok(tokio::spawn(run_watch_loop(store, watcher, rx, window, cancel, on_change)))
}

async fn run_watch_loop<F>(
    store: Arc<ConfigStore>,
    _watcher: RecommendedWatcher,
    mut rx: mpsc::Receiver<()>,
    window: Duration,
    cancel: CancellationToken,
    on_change: F,
) where
    F: Fn(Arc<Config>) + Send + 'static,
{
    let mut debouncer = Debouncer::new(window);
    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = rx.recv() => match event {
                Some(()) => debouncer.notify(Instant::now()),
                None => break,
            },
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if debouncer.fire(Instant::now()) {
                    match store.reload() {
                        Ok(config) => {
                            tracing::info!(path = %store.path().display(), "config reloaded");
                            on_change(config);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "config reload failed, keeping previous config");
                        }
                    }
                }
            }
        }
    }
    tracing::debug!("config watcher stopped");
}

#[cfg(test)]
#[path = "config_store_tests.rs"]
mod tests;
