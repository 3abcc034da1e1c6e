// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container update orchestrator
//!
//! Replaces a running container with one built from a fresh image. Compose
//! managed containers are handed to `docker compose`; everything else goes
//! through the Engine API as a fixed sequence of [`UpdateStep`]s where each
//! failing step maps to a [`Rollback`] that brings the original container
//! back up under its own name.

use std::sync::Arc;

use tada_adapters::{ComposeRunner, DockerEngine, DockerError};
use tada_core::{Container, DockerResult, ImageRef};

use crate::locks::ContainerLocks;

/// Suffix given to the original container while its replacement starts.
pub const BACKUP_SUFFIX: &str = "-old";

pub fn backup_name(name: &str) -> String {
    format!("{}{}", name, BACKUP_SUFFIX)
}

/// Steps of an Engine API update, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStep {
    Inspect,
    ResolveImage,
    Pull,
    Stop,
    Rename,
    Create,
    Start,
    RemoveBackup,
}

tada_core::simple_display! {
    UpdateStep {
        Inspect => "inspect",
        ResolveImage => "resolve_image",
        Pull => "pull",
        Stop => "stop",
        Rename => "rename",
        Create => "create",
        Start => "start",
        RemoveBackup => "remove_backup",
    }
}

impl UpdateStep {
    pub const FIRST: UpdateStep = UpdateStep::Inspect;

    pub fn next(self) -> Option<UpdateStep> {
        match self {
            UpdateStep::Inspect => Some(UpdateStep::ResolveImage),
            UpdateStep::ResolveImage => Some(UpdateStep::Pull),
            UpdateStep::Pull => Some(UpdateStep::Stop),
            UpdateStep::Stop => Some(UpdateStep::Rename),
            UpdateStep::Rename => Some(UpdateStep::Create),
            UpdateStep::Create => Some(UpdateStep::Start),
            UpdateStep::Start => Some(UpdateStep::RemoveBackup),
            UpdateStep::RemoveBackup => None,
        }
    }

    /// What to undo when this step fails.
    pub fn rollback(self) -> Rollback {
        match self {
            UpdateStep::Inspect | UpdateStep::ResolveImage | UpdateStep::Pull => Rollback::Abort,
            UpdateStep::Stop | UpdateStep::Rename => Rollback::RestartOriginal,
            UpdateStep::Create => Rollback::RestoreBackup,
            UpdateStep::Start => Rollback::DiscardAndRestore,
            UpdateStep::RemoveBackup => Rollback::Ignore,
        }
    }
}

/// Recovery action for a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollback {
    /// Nothing was touched yet.
    Abort,
    /// Start the original under its own name.
    RestartOriginal,
    /// Rename the backup back and start it.
    RestoreBackup,
    /// Remove the new container, then restore the backup.
    DiscardAndRestore,
    /// The update already succeeded.
    Ignore,
}

tada_core::simple_display! {
    Rollback {
        Abort => "abort",
        RestartOriginal => "restart_original",
        RestoreBackup => "restore_backup",
        DiscardAndRestore => "discard_and_restore",
        Ignore => "ignore",
    }
}

/// Restarts and updates configured containers.
#[derive(Clone)]
pub struct UpdateOrchestrator {
    engine: Arc<dyn DockerEngine>,
    compose: ComposeRunner,
    locks: ContainerLocks,
}

impl UpdateOrchestrator {
    pub fn new(engine: Arc<dyn DockerEngine>, compose: ComposeRunner, locks: ContainerLocks) -> Self {
        Self { engine, compose, locks }
    }

    pub fn engine(&self) -> &Arc<dyn DockerEngine> {
        &self.engine
    }

    /// Restart `name` in place.
    pub async fn restart(&self, name: &str) -> DockerResult {
        let _guard = self.locks.acquire(name).await;
        tracing::info!(container = name, "restarting container");
        match self.engine.restart_container(name).await {
            Ok(()) => {
                tracing::info!(container = name, "container restarted");
                DockerResult::success(format!("Container \"{}\" restarted", name))
            }
            Err(e) => {
                tracing::error!(container = name, error = %e, "restart failed");
                let message = match e {
                    DockerError::Status { status, body } => {
                        format!("Restart failed (HTTP {}): {}", status, body.trim())
                    }
                    other => format!("Restart failed: {}", other),
                };
                DockerResult::failure(message)
            }
        }
    }

    /// Pull the container's image and replace it.
    pub async fn update(&self, container: &Container) -> DockerResult {
        let _guard = self.locks.acquire(&container.name).await;
        let result = match &container.compose_file {
            Some(_) => self.update_via_compose(container).await,
            None => self.update_via_api(container).await,
        };
        if result.ok {
            tracing::info!(container = %container.name, "{}", result.message);
        } else {
            tracing::error!(container = %container.name, "{}", result.message);
        }
        result
    }

    async fn update_via_compose(&self, container: &Container) -> DockerResult {
        let Some(compose_file) = &container.compose_file else {
            return DockerResult::failure("Compose update failed: no compose file");
        };
        let service = container.compose_service();
        match self.compose.pull_and_up(compose_file, service).await {
            Ok(output) if output.success() => {
                DockerResult::success(format!("Container \"{}\" updated via compose", container.name))
            }
            Ok(output) => {
                let detail =
                    if output.stderr.trim().is_empty() { output.stdout.trim() } else { output.stderr.trim() };
                DockerResult::failure(format!("Compose update failed: {}", detail))
            }
            Err(e) => DockerResult::failure(format!("Compose update failed: {}", e)),
        }
    }

    async fn update_via_api(&self, container: &Container) -> DockerResult {
        let name = container.name.as_str();
        let backup = backup_name(name);
        let step = |s: UpdateStep| tracing::info!(container = name, step = %s, "update step");

        step(UpdateStep::Inspect);
        let inspect = match self.engine.inspect_container(name).await {
            Ok(inspect) => inspect,
            Err(e) if e.status() == Some(404) => {
                return DockerResult::failure(format!("Container \"{}\" not found", name));
            }
            Err(e) => {
                return DockerResult::failure(format!(
                    "Failed to inspect container \"{}\": {}",
                    name, e
                ));
            }
        };

        step(UpdateStep::ResolveImage);
        let Some(image) = container.image.as_deref().filter(|s| !s.is_empty()).or(inspect.image())
        else {
            return DockerResult::failure(format!("Cannot determine image for container \"{}\"", name));
        };
        let image = image.to_string();

        step(UpdateStep::Pull);
        if let Err(e) = self.engine.pull_image(&ImageRef::parse(&image)).await {
            return DockerResult::failure(format!("Pull failed: {}", e));
        }

        step(UpdateStep::Stop);
        if let Err(e) = self.engine.stop_container(name).await {
            let message = format!("Failed to stop container \"{}\": {}", name, e);
            return self.roll_back(UpdateStep::Stop, name, &backup, message).await;
        }

        step(UpdateStep::Rename);
        if let Err(e) = self.engine.rename_container(name, &backup).await {
            let message = format!("Failed to rename old container: {}", e);
            return self.roll_back(UpdateStep::Rename, name, &backup, message).await;
        }

        step(UpdateStep::Create);
        let body = inspect.create_body(&image);
        if let Err(e) = self.engine.create_container(name, &body).await {
            let message = format!("Failed to create new container: {}", e);
            return self.roll_back(UpdateStep::Create, name, &backup, message).await;
        }

        step(UpdateStep::Start);
        if let Err(e) = self.engine.start_container(name).await {
            let message = format!("Failed to start new container, rolled back: {}", e);
            return self.roll_back(UpdateStep::Start, name, &backup, message).await;
        }

        step(UpdateStep::RemoveBackup);
        if let Err(e) = self.engine.remove_container(&backup, true).await {
            tracing::warn!(container = name, backup = %backup, error = %e, "backup cleanup failed");
        }

        DockerResult::success(format!("Container \"{}\" updated with image \"{}\"", name, image))
    }

    /// Run the rollback for a failed `step` and report `message`.
    async fn roll_back(&self, step: UpdateStep, name: &str, backup: &str, message: String) -> DockerResult {
        let rollback = step.rollback();
        tracing::warn!(container = name, step = %step, rollback = %rollback, "rolling back update");
        match self.apply(rollback, name, backup).await {
            Ok(()) => DockerResult::failure(message),
            Err(e) => {
                tracing::error!(container = name, rollback = %rollback, error = %e, "rollback failed");
                DockerResult::failure(format!("{} (rollback incomplete: {})", message, e))
            }
        }
    }

    async fn apply(&self, rollback: Rollback, name: &str, backup: &str) -> Result<(), DockerError> {
        match rollback {
            Rollback::Abort | Rollback::Ignore => Ok(()),
            Rollback::RestartOriginal => self.engine.start_container(name).await,
            Rollback::RestoreBackup => {
                self.engine.rename_container(backup, name).await?;
                self.engine.start_container(name).await
            }
            Rollback::DiscardAndRestore => {
                self.engine.remove_container(name, true).await?;
                self.engine.rename_container(backup, name).await?;
                self.engine.start_container(name).await
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
