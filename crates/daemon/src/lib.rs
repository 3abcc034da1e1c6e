// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tada daemon library
//!
//! Config store, HTTP listener, and process lifecycle behind the `tada`
//! binary.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config_store;
pub mod env;
pub mod lifecycle;
pub mod listener;

pub use config_store::{ConfigStore, DebounceState, Debouncer};
pub use lifecycle::Options;
pub use listener::{router, AppState, ListenError, Runtime};
