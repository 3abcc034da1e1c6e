// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: child processes, the Docker Engine socket,
//! and the compose CLI.

pub mod compose;
pub mod docker;
pub mod subprocess;

pub use compose::ComposeRunner;
pub use docker::{ContainerInspect, DockerEngine, DockerError, EngineInfo, HttpDockerEngine};
pub use subprocess::{run_captured, ProcessOutput, SubprocessError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use docker::{DockerCall, DockerCallKind, FakeContainer, FakeDockerEngine};
