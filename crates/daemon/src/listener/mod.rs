// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP listener.
//!
//! Maps requests onto the action executor and the update orchestrator.
//! Handlers read one [`Runtime`] snapshot per request; config reloads swap
//! the whole runtime, so a request never sees half of an old config and
//! half of a new one.

mod action;
mod docker;
mod middleware;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tada_adapters::{ComposeRunner, DockerEngine, HttpDockerEngine};
use tada_core::{ActionResult, Config};
use tada_engine::{ContainerLocks, UpdateOrchestrator};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::env::{AGENT_NAME, AGENT_VERSION};

/// Errors from binding or serving.
#[derive(Debug, Error)]
pub enum ListenError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Everything a request needs, rebuilt on each config change.
pub struct Runtime {
    pub config: Arc<Config>,
    /// Present when the config has a `docker` section.
    pub docker: Option<UpdateOrchestrator>,
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    runtime: Arc<ArcSwap<Runtime>>,
    locks: ContainerLocks,
    compose: ComposeRunner,
}

impl AppState {
    /// State for `config` using `engine` for Docker operations.
    pub fn with_engine(config: Arc<Config>, engine: Option<Arc<dyn DockerEngine>>) -> Self {
        let locks = ContainerLocks::new();
        let compose = ComposeRunner::new();
        let runtime = build_runtime(config, engine, &compose, &locks);
        Self { runtime: Arc::new(ArcSwap::from_pointee(runtime)), locks, compose }
    }

    /// Switch to `config`, connecting to its Docker socket if it has one.
    ///
    /// Container locks carry over, so an update still running against the
    /// previous config keeps excluding new requests for the same container.
    pub fn apply(&self, config: Arc<Config>) {
        let engine = config.docker.as_ref().map(|docker| {
            let engine = HttpDockerEngine::new(docker.socket_path());
            let probe = engine.clone();
            tokio::spawn(async move { probe.probe().await });
            Arc::new(engine) as Arc<dyn DockerEngine>
        });
        self.install(config, engine);
    }

    /// Switch to `config` with an explicit engine.
    pub fn install(&self, config: Arc<Config>, engine: Option<Arc<dyn DockerEngine>>) {
        let runtime = build_runtime(config, engine, &self.compose, &self.locks);
        tracing::info!(
            actions = runtime.config.actions.len(),
            containers = runtime.config.containers().len(),
            docker = runtime.docker.is_some(),
            auth = runtime.config.token.is_some(),
            "config applied"
        );
        self.runtime.store(Arc::new(runtime));
    }

    pub fn runtime(&self) -> Arc<Runtime> {
        self.runtime.load_full()
    }
}

fn build_runtime(
    config: Arc<Config>,
    engine: Option<Arc<dyn DockerEngine>>,
    compose: &ComposeRunner,
    locks: &ContainerLocks,
) -> Runtime {
    let docker = config
        .docker
        .as_ref()
        .and(engine)
        .map(|engine| UpdateOrchestrator::new(engine, compose.clone(), locks.clone()));
    Runtime { config, docker }
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/action", get(action::run_query).post(action::run_json))
        .route("/docker", get(docker::handle))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), middleware::require_token));

    Router::new()
        .route("/", get(index))
        .merge(protected)
        .layer(axum::middleware::from_fn(middleware::trace_request))
        .with_state(state)
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ListenError> {
    TcpListener::bind(addr).await.map_err(|source| ListenError::Bind { addr, source })
}

/// Serve until `shutdown` is cancelled, then let in-flight requests finish.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), ListenError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(ListenError::Serve)
}

#[derive(Serialize)]
struct AgentInfo {
    name: &'static str,
    version: &'static str,
}

async fn index() -> Json<AgentInfo> {
    Json(AgentInfo { name: AGENT_NAME, version: AGENT_VERSION })
}

/// 200 when `ok`, 500 otherwise.
fn outcome<T: Serialize>(ok: bool, body: T) -> Response {
    let status = if ok { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR };
    (status, Json(body)).into_response()
}

/// Run `work` on its own task and answer with its outcome.
///
/// A client that hangs up drops the handler, not the task: an update past
/// its stop step still finishes or rolls back, and a running action is
/// only ended by its own timeout.
async fn detached<T, F>(work: F) -> Response
where
    F: Future<Output = (bool, T)> + Send + 'static,
    T: Serialize + Send + 'static,
{
    match tokio::spawn(work).await {
        Ok((ok, body)) => outcome(ok, body),
        Err(e) => {
            tracing::error!(error = %e, "request task failed");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

/// `{ok: false, error}` with `status`.
fn reject(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ActionResult::rejected(error))).into_response()
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
