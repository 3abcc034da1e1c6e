// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tada-core: configuration schema and shared types for the tada deploy agent

pub mod macros;

pub mod config;
pub mod image;
pub mod permission;
pub mod result;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{
    Action, CommandSpec, Config, ConfigError, Container, DockerConfig, DockerOp, Format,
    DEFAULT_ACTION_TIMEOUT_SECS, DEFAULT_DOCKER_SOCK,
};
pub use image::ImageRef;
pub use permission::check_permission;
pub use result::{ActionResult, DockerResult};
