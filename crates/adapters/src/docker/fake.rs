// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory Docker Engine for tests.
//!
//! Tracks containers by name with their image and running flag, records
//! every call, and fails the next call of a given kind on request.

use super::{ContainerInspect, DockerEngine, DockerError, EngineInfo};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tada_core::ImageRef;

/// A recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerCall {
    Info,
    Inspect(String),
    Pull(String),
    Stop(String),
    Start(String),
    Restart(String),
    Rename { from: String, to: String },
    Create { name: String, image: String },
    Remove { name: String, force: bool },
}

/// Call kinds that can have a failure injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockerCallKind {
    Inspect,
    Pull,
    Stop,
    Start,
    Restart,
    Rename,
    Create,
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeContainer {
    pub id: String,
    pub image: String,
    pub running: bool,
    /// Create body (or seeded config) the container was made from.
    pub body: Value,
}

#[derive(Default)]
struct FakeState {
    containers: HashMap<String, FakeContainer>,
    calls: Vec<DockerCall>,
    failures: Vec<DockerCallKind>,
    delays: Vec<(DockerCallKind, Duration)>,
    next_id: u32,
}

impl FakeState {
    fn new_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:064x}", self.next_id)
    }

    fn take_failure(&mut self, kind: DockerCallKind) -> Result<(), DockerError> {
        match self.failures.iter().position(|k| *k == kind) {
            Some(i) => {
                self.failures.remove(i);
                Err(DockerError::Status { status: 500, body: format!("injected {:?} failure", kind) })
            }
            None => Ok(()),
        }
    }

    fn take_delay(&mut self, kind: DockerCallKind) -> Option<Duration> {
        let i = self.delays.iter().position(|(k, _)| *k == kind)?;
        Some(self.delays.remove(i).1)
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut FakeContainer, DockerError> {
        self.containers.get_mut(name).ok_or_else(|| not_found(name))
    }
}

fn not_found(name: &str) -> DockerError {
    DockerError::Status { status: 404, body: format!("No such container: {}", name) }
}

fn conflict(message: String) -> DockerError {
    DockerError::Status { status: 409, body: message }
}

#[derive(Clone, Default)]
pub struct FakeDockerEngine {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeDockerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a running container.
    pub fn with_container(self, name: &str, image: &str) -> Self {
        {
            let mut state = self.inner.lock();
            let id = state.new_id();
            let body = json!({ "Image": image, "Env": ["APP=1"], "HostConfig": { "RestartPolicy": { "Name": "always" } } });
            state
                .containers
                .insert(name.to_string(), FakeContainer { id, image: image.to_string(), running: true, body });
        }
        self
    }

    /// Make the next call of `kind` fail with HTTP 500.
    pub fn fail_next(&self, kind: DockerCallKind) {
        self.inner.lock().failures.push(kind);
    }

    /// Make the next call of `kind` take `delay` before it does anything.
    pub fn delay_next(&self, kind: DockerCallKind, delay: Duration) {
        self.inner.lock().delays.push((kind, delay));
    }

    async fn pause(&self, kind: DockerCallKind) {
        let delay = self.inner.lock().take_delay(kind);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn container(&self, name: &str) -> Option<FakeContainer> {
        self.inner.lock().containers.get(name).cloned()
    }

    pub fn container_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.lock().containers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn calls(&self) -> Vec<DockerCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl DockerEngine for FakeDockerEngine {
    async fn info(&self) -> Result<EngineInfo, DockerError> {
        self.inner.lock().calls.push(DockerCall::Info);
        Ok(EngineInfo { server_version: "fake".into() })
    }

    async fn inspect_container(&self, name: &str) -> Result<ContainerInspect, DockerError> {
        self.pause(DockerCallKind::Inspect).await;
        let mut state = self.inner.lock();
        state.calls.push(DockerCall::Inspect(name.into()));
        state.take_failure(DockerCallKind::Inspect)?;
        let c = state.get_mut(name)?;
        let host_config = c.body.get("HostConfig").cloned().unwrap_or(Value::Null);
        let mut config = c.body.clone();
        if let Value::Object(map) = &mut config {
            map.remove("HostConfig");
            map.remove("NetworkingConfig");
        }
        Ok(ContainerInspect {
            id: c.id.clone(),
            config,
            host_config,
            network_settings: json!({ "Networks": { "bridge": { "Aliases": null } } }),
        })
    }

    async fn pull_image(&self, image: &ImageRef) -> Result<(), DockerError> {
        self.pause(DockerCallKind::Pull).await;
        let mut state = self.inner.lock();
        state.calls.push(DockerCall::Pull(image.to_string()));
        state.take_failure(DockerCallKind::Pull)
    }

    async fn stop_container(&self, name: &str) -> Result<(), DockerError> {
        self.pause(DockerCallKind::Stop).await;
        let mut state = self.inner.lock();
        state.calls.push(DockerCall::Stop(name.into()));
        state.take_failure(DockerCallKind::Stop)?;
        state.get_mut(name)?.running = false;
        Ok(())
    }

    async fn start_container(&self, name: &str) -> Result<(), DockerError> {
        self.pause(DockerCallKind::Start).await;
        let mut state = self.inner.lock();
        state.calls.push(DockerCall::Start(name.into()));
        state.take_failure(DockerCallKind::Start)?;
        state.get_mut(name)?.running = true;
        Ok(())
    }

    async fn restart_container(&self, name: &str) -> Result<(), DockerError> {
        self.pause(DockerCallKind::Restart).await;
        let mut state = self.inner.lock();
        state.calls.push(DockerCall::Restart(name.into()));
        state.take_failure(DockerCallKind::Restart)?;
        state.get_mut(name)?.running = true;
        Ok(())
    }

    async fn rename_container(&self, name: &str, new_name: &str) -> Result<(), DockerError> {
        self.pause(DockerCallKind::Rename).await;
        let mut state = self.inner.lock();
        state.calls.push(DockerCall::Rename { from: name.into(), to: new_name.into() });
        state.take_failure(DockerCallKind::Rename)?;
        if state.containers.contains_key(new_name) {
            return Err(conflict(format!("name {} is already in use", new_name)));
        }
        let c = state.containers.remove(name).ok_or_else(|| not_found(name))?;
        state.containers.insert(new_name.to_string(), c);
        Ok(())
    }

    async fn create_container(&self, name: &str, body: &Value) -> Result<(), DockerError> {
        self.pause(DockerCallKind::Create).await;
        let image = body.get("Image").and_then(Value::as_str).unwrap_or_default().to_string();
        let mut state = self.inner.lock();
        state.calls.push(DockerCall::Create { name: name.into(), image: image.clone() });
        state.take_failure(DockerCallKind::Create)?;
        if state.containers.contains_key(name) {
            return Err(conflict(format!("name {} is already in use", name)));
        }
        let id = state.new_id();
        state
            .containers
            .insert(name.to_string(), FakeContainer { id, image, running: false, body: body.clone() });
        Ok(())
    }

    async fn remove_container(&self, name: &str, force: bool) -> Result<(), DockerError> {
        self.pause(DockerCallKind::Remove).await;
        let mut state = self.inner.lock();
        state.calls.push(DockerCall::Remove { name: name.into(), force });
        state.take_failure(DockerCallKind::Remove)?;
        if state.get_mut(name)?.running && !force {
            return Err(conflict(format!("container {} is running", name)));
        }
        state.containers.remove(name);
        Ok(())
    }
}
