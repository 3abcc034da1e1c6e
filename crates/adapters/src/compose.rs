// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `docker compose` pull-and-up for compose-managed containers.

use crate::subprocess::{run_captured, ProcessOutput, SubprocessError};
use std::path::Path;
use tokio::process::Command;

/// Runs `docker compose` through `sh -c`.
#[derive(Debug, Clone)]
pub struct ComposeRunner {
    docker_bin: String,
}

impl Default for ComposeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposeRunner {
    pub fn new() -> Self {
        Self { docker_bin: "docker".to_string() }
    }

    /// Use a different `docker` executable.
    pub fn with_docker_bin(docker_bin: impl Into<String>) -> Self {
        Self { docker_bin: docker_bin.into() }
    }

    /// `pull <service> && up -d <service>` as one shell line, so a failed
    /// pull never reaches `up`.
    pub fn update_command(&self, compose_file: &Path, service: &str) -> String {
        let base = format!(
            "{} compose -f {}",
            shell_quote(&self.docker_bin),
            shell_quote(&compose_file.to_string_lossy())
        );
        let service = shell_quote(service);
        format!("{base} pull {service} && {base} up -d {service}")
    }

    /// Pull and recreate `service`. No timeout: compose owns convergence.
    pub async fn pull_and_up(
        &self,
        compose_file: &Path,
        service: &str,
    ) -> Result<ProcessOutput, SubprocessError> {
        let line = self.update_command(compose_file, service);
        tracing::info!(command = %line, "running compose update");
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&line);
        run_captured(cmd, None).await
    }
}

/// Single-quote `s` for `sh`, leaving plain words untouched.
fn shell_quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '@' | '='));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
#[path = "compose_tests.rs"]
mod tests;
