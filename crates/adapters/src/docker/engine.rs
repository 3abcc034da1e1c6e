// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`DockerEngine`] backed by the Engine API on a Unix socket.

use super::http::{self, encode};
use super::{ContainerInspect, DockerEngine, DockerError, EngineInfo};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tada_core::ImageRef;

/// Bound on the startup connectivity probe. Regular calls are unbounded.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct HttpDockerEngine {
    socket_path: PathBuf,
}

impl HttpDockerEngine {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into() }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Check connectivity and log the server version.
    ///
    /// Failure only warns: the socket may come up after the agent does.
    pub async fn probe(&self) {
        match tokio::time::timeout(PROBE_TIMEOUT, self.info()).await {
            Ok(Ok(info)) => tracing::info!(
                version = %info.server_version,
                sock = %self.socket_path.display(),
                "docker connected"
            ),
            Ok(Err(e)) => tracing::warn!(
                sock = %self.socket_path.display(),
                error = %e,
                "docker connection failed"
            ),
            Err(_) => tracing::warn!(
                sock = %self.socket_path.display(),
                "docker connection timed out"
            ),
        }
    }

    async fn call(&self, method: &str, path: &str, body: Option<&str>) -> Result<String, DockerError> {
        tracing::debug!(method, path, "docker api");
        http::request(&self.socket_path, method, path, body).await?.into_result()
    }

    async fn post(&self, path: &str) -> Result<(), DockerError> {
        self.call("POST", path, None).await.map(|_| ())
    }
}

#[async_trait]
impl DockerEngine for HttpDockerEngine {
    async fn info(&self) -> Result<EngineInfo, DockerError> {
        let body = self.call("GET", "/info", None).await?;
        serde_json::from_str(&body).map_err(|e| DockerError::Protocol(e.to_string()))
    }

    async fn inspect_container(&self, name: &str) -> Result<ContainerInspect, DockerError> {
        let body = self.call("GET", &format!("/containers/{}/json", encode(name)), None).await?;
        serde_json::from_str(&body).map_err(|e| DockerError::Protocol(e.to_string()))
    }

    async fn pull_image(&self, image: &ImageRef) -> Result<(), DockerError> {
        let path = format!(
            "/images/create?fromImage={}&tag={}",
            encode(&image.repository),
            encode(&image.tag)
        );
        let body = self.call("POST", &path, None).await?;
        match pull_stream_error(&body) {
            Some(message) => Err(DockerError::Pull(message)),
            None => Ok(()),
        }
    }

    async fn stop_container(&self, name: &str) -> Result<(), DockerError> {
        self.post(&format!("/containers/{}/stop", encode(name))).await
    }

    async fn start_container(&self, name: &str) -> Result<(), DockerError> {
        self.post(&format!("/containers/{}/start", encode(name))).await
    }

    async fn restart_container(&self, name: &str) -> Result<(), DockerError> {
        self.post(&format!("/containers/{}/restart", encode(name))).await
    }

    async fn rename_container(&self, name: &str, new_name: &str) -> Result<(), DockerError> {
        self.post(&format!("/containers/{}/rename?name={}", encode(name), encode(new_name))).await
    }

    async fn create_container(&self, name: &str, body: &Value) -> Result<(), DockerError> {
        let json = serde_json::to_string(body).map_err(|e| DockerError::Protocol(e.to_string()))?;
        self.call("POST", &format!("/containers/create?name={}", encode(name)), Some(&json))
            .await
            .map(|_| ())
    }

    async fn remove_container(&self, name: &str, force: bool) -> Result<(), DockerError> {
        self.call("DELETE", &format!("/containers/{}?force={}", encode(name), force), None)
            .await
            .map(|_| ())
    }
}

/// First `error` reported in an image-pull progress stream.
///
/// The Engine answers 200 and streams one JSON object per line; failures
/// partway through show up as `{"error": "...", "errorDetail": {...}}`.
pub(crate) fn pull_stream_error(body: &str) -> Option<String> {
    body.lines()
        .filter_map(|line| serde_json::from_str::<Value>(line.trim()).ok())
        .find_map(|event| event.get("error").and_then(Value::as_str).map(str::to_string))
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
