// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::config::{Action, CommandSpec, Container, DockerOp, DEFAULT_ACTION_TIMEOUT_SECS};
use std::path::PathBuf;

/// Action running `command` through `sh -c`.
pub fn shell_action(name: &str, command: &str) -> Action {
    Action {
        name: name.to_string(),
        script: None,
        command: Some(CommandSpec::Shell(command.to_string())),
        cwd: None,
        timeout: DEFAULT_ACTION_TIMEOUT_SECS,
    }
}

/// Action executing `argv` directly.
pub fn argv_action(name: &str, argv: &[&str]) -> Action {
    Action {
        command: Some(CommandSpec::Argv(argv.iter().map(|s| s.to_string()).collect())),
        ..shell_action(name, "")
    }
}

/// Action running `sh <script>`.
pub fn script_action(name: &str, script: impl Into<PathBuf>) -> Action {
    Action { script: Some(script.into()), command: None, ..shell_action(name, "") }
}

/// Container updated through the Engine API.
pub fn container(name: &str, allow: &[DockerOp]) -> Container {
    Container {
        name: name.to_string(),
        allow: allow.iter().map(|op| op.to_string()).collect(),
        image: None,
        compose_file: None,
        service: None,
    }
}
