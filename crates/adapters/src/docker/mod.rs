// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker Engine adapter.
//!
//! # Module layout
//!
//! - [`http`]: HTTP/1.1 over the Engine's Unix socket
//! - [`engine`]: [`HttpDockerEngine`], the real [`DockerEngine`]
//! - `fake`: in-memory engine with failure injection (tests only)

pub mod engine;
pub mod http;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DockerCall, DockerCallKind, FakeContainer, FakeDockerEngine};

pub use engine::HttpDockerEngine;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tada_core::ImageRef;
use thiserror::Error;

/// Errors from Engine API calls.
#[derive(Debug, Error)]
pub enum DockerError {
    #[error("connect to {path} failed: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Protocol(String),
    #[error("{0}")]
    Pull(String),
}

impl DockerError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DockerError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Subset of `GET /info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EngineInfo {
    #[serde(default)]
    pub server_version: String,
}

/// Subset of `GET /containers/{name}/json` needed to recreate a container.
///
/// `Config` and `HostConfig` are kept as raw JSON so every field survives
/// the round trip into `POST /containers/create`, including ones this crate
/// has never heard of.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerInspect {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub host_config: Value,
    #[serde(default)]
    pub network_settings: Value,
}

impl ContainerInspect {
    /// Image the container was created from (`Config.Image`).
    pub fn image(&self) -> Option<&str> {
        self.config.get("Image").and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// Body for `POST /containers/create` that reproduces this container
    /// with `image` swapped in.
    pub fn create_body(&self, image: &str) -> Value {
        let mut body = match &self.config {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        body.insert("Image".into(), Value::String(image.to_string()));
        if !self.host_config.is_null() {
            body.insert("HostConfig".into(), self.host_config.clone());
        }
        if let Some(endpoints) = self.endpoints_config() {
            body.insert("NetworkingConfig".into(), serde_json::json!({ "EndpointsConfig": endpoints }));
        }
        Value::Object(body)
    }

    /// Rebuild `EndpointsConfig` from `NetworkSettings.Networks`.
    ///
    /// Only the user-settable parts are carried over; aliases that are the
    /// old container's short id are dropped so they do not follow the name.
    fn endpoints_config(&self) -> Option<Map<String, Value>> {
        let networks = self.network_settings.get("Networks")?.as_object()?;
        let short_id = self.id.get(..12).unwrap_or(&self.id);
        let mut endpoints = Map::new();
        for (network, settings) in networks {
            let mut endpoint = Map::new();
            for key in ["IPAMConfig", "Links"] {
                if let Some(v) = settings.get(key).filter(|v| !v.is_null()) {
                    endpoint.insert(key.to_string(), v.clone());
                }
            }
            if let Some(aliases) = settings.get("Aliases").and_then(Value::as_array) {
                let kept: Vec<Value> = aliases
                    .iter()
                    .filter(|a| short_id.is_empty() || a.as_str() != Some(short_id))
                    .cloned()
                    .collect();
                if !kept.is_empty() {
                    endpoint.insert("Aliases".into(), Value::Array(kept));
                }
            }
            endpoints.insert(network.clone(), Value::Object(endpoint));
        }
        if endpoints.is_empty() {
            None
        } else {
            Some(endpoints)
        }
    }
}

/// Container lifecycle operations against a Docker Engine.
#[async_trait]
pub trait DockerEngine: Send + Sync + 'static {
    /// `GET /info`
    async fn info(&self) -> Result<EngineInfo, DockerError>;

    /// `GET /containers/{name}/json`
    async fn inspect_container(&self, name: &str) -> Result<ContainerInspect, DockerError>;

    /// `POST /images/create`, failing on errors reported inside the
    /// progress stream as well as on HTTP status.
    async fn pull_image(&self, image: &ImageRef) -> Result<(), DockerError>;

    async fn stop_container(&self, name: &str) -> Result<(), DockerError>;

    async fn start_container(&self, name: &str) -> Result<(), DockerError>;

    async fn restart_container(&self, name: &str) -> Result<(), DockerError>;

    async fn rename_container(&self, name: &str, new_name: &str) -> Result<(), DockerError>;

    /// `POST /containers/create?name=...` with a full create body.
    async fn create_container(&self, name: &str, body: &Value) -> Result<(), DockerError>;

    /// `DELETE /containers/{name}`
    async fn remove_container(&self, name: &str, force: bool) -> Result<(), DockerError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
