// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Action execution and container update orchestration.

pub mod executor;
pub mod locks;
pub mod orchestrator;

pub use executor::{run_action, Invocation, Payload};
pub use locks::ContainerLocks;
pub use orchestrator::{backup_name, Rollback, UpdateOrchestrator, UpdateStep};
