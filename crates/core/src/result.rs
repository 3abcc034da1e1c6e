// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-request outcomes returned to HTTP callers.

use serde::{Deserialize, Serialize};

/// Outcome of running an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl ActionResult {
    /// A failure that happened before any process was spawned.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self { ok: false, error: Some(error.into()), ..Self::default() }
    }

    /// Result of a process that ran to exit (or was killed).
    pub fn exited(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            ok: exit_code == 0,
            error: None,
            exit_code: Some(exit_code),
            stdout: Some(stdout),
            stderr: Some(stderr),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.ok = false;
        self.error = Some(error.into());
        self
    }
}

/// Outcome of a container restart or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerResult {
    pub ok: bool,
    pub message: String,
}

impl DockerResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self { ok: true, message: message.into() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { ok: false, message: message.into() }
    }
}
