// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /docker?name=<container>&action=<restart|update>`

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use tada_core::{check_permission, DockerOp};

use super::{detached, reject, AppState};

#[derive(Debug, Deserialize)]
pub struct DockerQuery {
    name: Option<String>,
    action: Option<String>,
}

pub async fn handle(State(state): State<AppState>, Query(query): Query<DockerQuery>) -> Response {
    let runtime = state.runtime();
    let Some(orchestrator) = runtime.docker.as_ref() else {
        return reject(StatusCode::NOT_IMPLEMENTED, "Docker not configured");
    };

    let (Some(name), Some(action)) = (
        query.name.filter(|s| !s.is_empty()),
        query.action.filter(|s| !s.is_empty()),
    ) else {
        return reject(StatusCode::BAD_REQUEST, "Missing name or action");
    };

    let containers = runtime.config.containers();
    if let Some(error) = check_permission(containers, &name, &action) {
        tracing::warn!(container = %name, action = %action, %error, "docker request denied");
        return reject(StatusCode::FORBIDDEN, error);
    }
    let (Some(container), Some(op)) = (runtime.config.find_container(&name), DockerOp::parse(&action))
    else {
        return reject(StatusCode::BAD_REQUEST, format!("Unknown action: {}", action));
    };

    let orchestrator = orchestrator.clone();
    let container = container.clone();
    detached(async move {
        let result = match op {
            DockerOp::Restart => orchestrator.restart(&container.name).await,
            DockerOp::Update => orchestrator.update(&container).await,
        };
        (result.ok, result)
    })
    .await
}
