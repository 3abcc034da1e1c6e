// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action executor
//!
//! Looks up a named action, validates it, and runs it as a child process
//! with the request payload in `PAYLOAD`. Every failure, including unknown
//! names and malformed definitions, comes back as an [`ActionResult`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use tada_adapters::subprocess::run_captured;
use tada_core::{Action, ActionResult, CommandSpec};
use tokio::process::Command;

/// Request parameters handed to an action.
pub type Payload = BTreeMap<String, String>;

/// How an action is turned into a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Literal argv, no shell.
    Direct(Vec<String>),
    /// `sh -c <line>`
    Shell(String),
    /// `sh <script>`
    Script(PathBuf),
}

impl Invocation {
    /// Validate `action` and pick its invocation.
    ///
    /// Exactly one of `script` / `command` must be set; empty strings count
    /// as unset.
    pub fn resolve(action: &Action) -> Result<Self, String> {
        let script = action.script.as_ref().filter(|p| !p.as_os_str().is_empty());
        let command = action
            .command
            .as_ref()
            .filter(|c| !matches!(c, CommandSpec::Shell(s) if s.is_empty()));

        match (script, command) {
            (None, None) => {
                Err(format!("Action \"{}\" must have either 'script' or 'command'", action.name))
            }
            (Some(_), Some(_)) => {
                Err(format!("Action \"{}\" cannot have both 'script' and 'command'", action.name))
            }
            (Some(script), None) => Ok(Invocation::Script(script.clone())),
            (None, Some(CommandSpec::Shell(line))) => Ok(Invocation::Shell(line.clone())),
            (None, Some(CommandSpec::Argv(argv))) if argv.is_empty() => {
                Err(format!("Action \"{}\" has an empty command", action.name))
            }
            (None, Some(CommandSpec::Argv(argv))) => Ok(Invocation::Direct(argv.clone())),
        }
    }

    fn command(&self) -> Command {
        match self {
            Invocation::Direct(argv) => {
                let mut cmd = Command::new(&argv[0]);
                cmd.args(&argv[1..]);
                cmd
            }
            Invocation::Shell(line) => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(line);
                cmd
            }
            Invocation::Script(path) => {
                let mut cmd = Command::new("sh");
                cmd.arg(path);
                cmd
            }
        }
    }
}

/// Run the action called `name` from `actions`.
pub async fn run_action(actions: &[Action], name: &str, payload: &Payload) -> ActionResult {
    let Some(action) = actions.iter().find(|a| !a.name.is_empty() && a.name == name) else {
        tracing::warn!(action = name, "unknown action");
        return ActionResult::rejected(format!("Unknown action: {}", name));
    };

    let invocation = match Invocation::resolve(action) {
        Ok(invocation) => invocation,
        Err(error) => {
            tracing::warn!(action = name, %error, "invalid action definition");
            return ActionResult::rejected(error);
        }
    };

    let Some(timeout) = action.timeout_duration() else {
        let error = format!("Invalid timeout for action \"{}\": {}", name, action.timeout);
        tracing::warn!(action = name, %error, "invalid action definition");
        return ActionResult::rejected(error);
    };

    let payload_json = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    let mut cmd = invocation.command();
    cmd.env("PAYLOAD", payload_json);
    if let Some(cwd) = &action.cwd {
        cmd.current_dir(cwd);
    }

    tracing::info!(
        action = name,
        invocation = ?invocation,
        cwd = ?action.cwd,
        timeout_secs = action.timeout,
        "running action"
    );

    let output = match run_captured(cmd, Some(timeout)).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(action = name, error = %e, "action failed to start");
            return ActionResult::rejected(format!("Failed to spawn action \"{}\": {}", name, e));
        }
    };

    let timed_out = output.timed_out;
    let result = ActionResult::exited(output.exit_code, output.stdout, output.stderr);
    if timed_out {
        let message = format!("Action \"{}\" timed out after {}s", name, action.timeout);
        tracing::error!(action = name, exit_code = result.exit_code, "{}", message);
        return result.with_error(message);
    }

    if result.ok {
        tracing::info!(action = name, "action succeeded");
    } else {
        tracing::warn!(
            action = name,
            exit_code = result.exit_code,
            stderr = result.stderr.as_deref().unwrap_or(""),
            "action failed"
        );
    }
    result
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
