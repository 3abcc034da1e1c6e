// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed configuration schema for the agent.
//!
//! A [`Config`] is an immutable snapshot: it is parsed and validated in one
//! go and never mutated afterwards. Reloads build a fresh value and swap it
//! in whole.
//!
//! The document may be TOML or JSON (chosen by file extension):
//!
//! ```toml
//! token = "secret"
//!
//! [[actions]]
//! name = "deploy"
//! script = "/srv/app/deploy.sh"
//! timeout = 600
//!
//! [docker]
//! sock = "/var/run/docker.sock"
//!
//! [[docker.containers]]
//! name = "web"
//! allow = ["restart", "update"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Socket used when `docker.sock` is not set.
pub const DEFAULT_DOCKER_SOCK: &str = "/var/run/docker.sock";

/// Action timeout used when `timeout` is not set.
pub const DEFAULT_ACTION_TIMEOUT_SECS: f64 = 300.0;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Document format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// `.json` files are JSON; everything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Toml,
        }
    }
}

/// Process-wide configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Bearer token required on every request when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker: Option<DockerConfig>,
}

/// A named, operator-defined command.
///
/// `script` and `command` are mutually exclusive, but that is checked when
/// the action is invoked rather than here, so one broken entry does not
/// take the whole file down. The same goes for the timeout. An entry
/// without a name loads but can never be invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Action {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    /// Seconds before the process is killed; fractions allowed.
    #[serde(default = "default_timeout")]
    pub timeout: f64,
}

fn default_timeout() -> f64 {
    DEFAULT_ACTION_TIMEOUT_SECS
}

impl Action {
    /// `timeout` as a duration, `None` when negative or not finite.
    pub fn timeout_duration(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.timeout).ok()
    }
}

/// How an action's `command` is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    /// Run through `sh -c`, so pipes and `&&` work.
    Shell(String),
    /// Executed directly, no shell interpretation.
    Argv(Vec<String>),
}

/// The `[docker]` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DockerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sock: Option<PathBuf>,
    #[serde(default)]
    pub containers: Vec<Container>,
}

impl DockerConfig {
    /// Configured socket, or [`DEFAULT_DOCKER_SOCK`].
    pub fn socket_path(&self) -> PathBuf {
        self.sock.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DOCKER_SOCK))
    }
}

/// A Docker container the agent may operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Container {
    /// Docker container name.
    #[serde(default)]
    pub name: String,
    /// Granted operation names. Names that are not a [`DockerOp`] are kept
    /// but never match a request that reaches the orchestrator.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Image to update to; defaults to the container's current image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// When set, updates go through `docker compose` instead of the Engine API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compose_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl Container {
    /// Compose service name, defaulting to the container name.
    pub fn compose_service(&self) -> &str {
        self.service.as_deref().filter(|s| !s.is_empty()).unwrap_or(&self.name)
    }

    pub fn allows(&self, op: DockerOp) -> bool {
        let op = op.to_string();
        self.allow.iter().any(|a| *a == op)
    }
}

/// Remote operations that can be granted on a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockerOp {
    Restart,
    Update,
}

crate::simple_display! {
    DockerOp {
        Restart => "restart",
        Update => "update",
    }
}

impl DockerOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "restart" => Some(DockerOp::Restart),
            "update" => Some(DockerOp::Update),
            _ => None,
        }
    }
}

impl Config {
    /// Read, parse, and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&content, Format::from_path(path), path)
    }

    /// Parse and validate config text. `path` is only used in error messages.
    pub fn parse(content: &str, format: Format, path: &Path) -> Result<Self, ConfigError> {
        let parsed: Config = match format {
            Format::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::Parse { path: path.to_path_buf(), message: e.to_string() })?,
            Format::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::Parse { path: path.to_path_buf(), message: e.to_string() })?,
        };
        let config = parsed.normalized();
        config.validate().map_err(|message| ConfigError::Invalid { path: path.to_path_buf(), message })?;
        Ok(config)
    }

    /// An empty token means no auth.
    fn normalized(mut self) -> Self {
        self.token = self.token.filter(|t| !t.is_empty());
        self
    }

    /// Named entries must be unique. Nameless ones are skipped.
    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for action in self.actions.iter().filter(|a| !a.name.is_empty()) {
            if !seen.insert(action.name.as_str()) {
                return Err(format!("duplicate action name \"{}\"", action.name));
            }
        }
        let mut seen = HashSet::new();
        for container in self.containers().iter().filter(|c| !c.name.is_empty()) {
            if !seen.insert(container.name.as_str()) {
                return Err(format!("duplicate container name \"{}\"", container.name));
            }
        }
        Ok(())
    }

    /// Configured containers, empty when there is no `[docker]` block.
    pub fn containers(&self) -> &[Container] {
        self.docker.as_ref().map(|d| d.containers.as_slice()).unwrap_or(&[])
    }

    pub fn find_action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| !a.name.is_empty() && a.name == name)
    }

    pub fn find_container(&self, name: &str) -> Option<&Container> {
        self.containers().iter().find(|c| !c.name.is_empty() && c.name == name)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
