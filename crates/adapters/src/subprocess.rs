// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with captured output and an optional deadline.
//!
//! Children run in their own process group so a timeout kills the whole
//! tree (`sh -c` plus whatever it forked), not just the shell.

use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How long to keep draining pipes after the process is gone.
///
/// A grandchild that escaped the process group can hold the pipes open
/// forever; past this point whatever was read is returned.
pub const OUTPUT_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("spawn failed: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("wait failed: {0}")]
    Wait(#[source] std::io::Error),
}

/// Exit status and captured streams of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or `128 + signal` when killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// The deadline passed and the process group was killed.
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Spawn `cmd`, capture stdout/stderr in full, and wait for it to exit.
///
/// With a `timeout`, the process group is sent SIGKILL once it elapses and
/// the (abnormal) exit status is still awaited before returning.
pub async fn run_captured(
    mut cmd: Command,
    timeout: Option<Duration>,
) -> Result<ProcessOutput, SubprocessError> {
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(SubprocessError::Spawn)?;
    let stdout = child.stdout.take().map(|s| tokio::spawn(read_all(s)));
    let stderr = child.stderr.take().map(|s| tokio::spawn(read_all(s)));

    let (status, timed_out) = match timeout {
        None => (child.wait().await.map_err(SubprocessError::Wait)?, false),
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => (status.map_err(SubprocessError::Wait)?, false),
            Err(_) => {
                kill_group(&mut child);
                (child.wait().await.map_err(SubprocessError::Wait)?, true)
            }
        },
    };

    let drain_until = Instant::now() + OUTPUT_GRACE;
    let stdout = collect(stdout, timeout.map(|_| drain_until)).await;
    let stderr = collect(stderr, timeout.map(|_| drain_until)).await;

    Ok(ProcessOutput { exit_code: exit_code(status), stdout, stderr, timed_out })
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}

fn kill_group(child: &mut Child) {
    if let Some(pid) = child.id() {
        let pgid = nix::unistd::Pid::from_raw(pid as i32);
        match nix::sys::signal::killpg(pgid, nix::sys::signal::Signal::SIGKILL) {
            Ok(()) => return,
            Err(e) => tracing::warn!(pid, error = %e, "killpg failed, killing child only"),
        }
    }
    if let Err(e) = child.start_kill() {
        tracing::warn!(error = %e, "failed to kill child process");
    }
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        tracing::debug!(error = %e, "pipe read ended with error");
    }
    buf
}

async fn collect(handle: Option<JoinHandle<Vec<u8>>>, until: Option<Instant>) -> String {
    let Some(handle) = handle else {
        return String::new();
    };
    let bytes = match until {
        None => handle.await.unwrap_or_default(),
        Some(deadline) => {
            let abort = handle.abort_handle();
            match tokio::time::timeout_at(deadline, handle).await {
                Ok(joined) => joined.unwrap_or_default(),
                Err(_) => {
                    abort.abort();
                    tracing::warn!("output pipe still open after process exit, truncating");
                    Vec::new()
                }
            }
        }
    };
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
