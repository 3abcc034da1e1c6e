// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::time::Duration;

/// Agent name reported by `GET /`.
pub const AGENT_NAME: &str = "tada";

/// Agent version (from Cargo.toml)
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default quiet period before a config change is reloaded.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Config reload debounce window (`TADA_DEBOUNCE_MS`, default 100ms)
pub fn debounce_window() -> Duration {
    std::env::var("TADA_DEBOUNCE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_DEBOUNCE)
}

/// Log filter directive (`TADA_LOG`, default `info`)
pub fn log_filter() -> String {
    std::env::var("TADA_LOG").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "info".to_string())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
