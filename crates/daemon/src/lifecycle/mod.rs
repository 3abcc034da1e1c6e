// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: startup, serving, shutdown.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config_store::{self, ConfigStore};
use crate::env;
use crate::listener::{self, AppState};

/// Where to listen and what to load.
#[derive(Debug, Clone)]
pub struct Options {
    pub bind: IpAddr,
    pub port: u16,
    pub config: PathBuf,
}

impl Options {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// Load the config, start the watcher, and serve until a shutdown signal.
///
/// A config that fails to load here is fatal; later reload failures only
/// keep the previous config.
pub async fn run(options: Options) -> anyhow::Result<()> {
    let store = ConfigStore::load(&options.config)
        .with_context(|| format!("failed to load config {}", options.config.display()))?;
    let store = Arc::new(store);

    let state = AppState::with_engine(store.snapshot(), None);
    let shutdown = CancellationToken::new();

    let watcher = {
        let state = state.clone();
        config_store::watch(Arc::clone(&store), env::debounce_window(), shutdown.clone(), move |config| {
            state.apply(config)
        })
        .context("failed to watch config")?
    };

    let listener = listener::bind(options.addr()).await?;
    info!(
        addr = %options.addr(),
        config = %options.config.display(),
        version = env::AGENT_VERSION,
        "tada running"
    );

    tokio::spawn(cancel_on_signal(shutdown.clone()));
    let served = listener::serve(listener, state, shutdown.clone()).await;

    shutdown.cancel();
    if let Err(e) = watcher.await {
        tracing::warn!(error = %e, "config watcher task failed");
    }
    served?;
    info!("tada stopped");
    Ok(())
}

/// Cancel `token` on Ctrl-C or SIGTERM.
pub async fn cancel_on_signal(token: CancellationToken) {
    let mut terminate = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(signal) => Some(signal),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for SIGTERM");
            None
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupt received, shutting down"),
        Some(()) = async {
            match terminate.as_mut() {
                Some(signal) => signal.recv().await,
                None => std::future::pending().await,
            }
        } => info!("SIGTERM received, shutting down"),
        _ = token.cancelled() => {}
    }
    token.cancel();
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
