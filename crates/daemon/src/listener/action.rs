// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/action` handlers.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::{Map, Value};
use tada_engine::{run_action, Payload};

use super::{detached, reject, AppState};

/// `GET /action?name=<action>&...`: remaining query parameters are the payload.
pub async fn run_query(State(state): State<AppState>, Query(mut params): Query<Payload>) -> Response {
    let Some(name) = params.remove("name").filter(|n| !n.is_empty()) else {
        return reject(StatusCode::BAD_REQUEST, "Missing name");
    };
    run(&state, name, params).await
}

/// `POST /action` with a JSON object naming the action in `action` or `name`.
///
/// A body that is not a JSON object is treated as empty.
pub async fn run_json(State(state): State<AppState>, body: Bytes) -> Response {
    let fields: Map<String, Value> = serde_json::from_slice(&body).unwrap_or_default();
    let Some((name, payload)) = split_body(fields) else {
        return reject(StatusCode::BAD_REQUEST, "Missing name");
    };
    run(&state, name, payload).await
}

/// Take the action name out of `fields`; everything else becomes payload,
/// with non-string values rendered as JSON text.
pub(super) fn split_body(mut fields: Map<String, Value>) -> Option<(String, Payload)> {
    let name = ["action", "name"].iter().find_map(|key| match fields.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some((*key, s.clone())),
        _ => None,
    });
    let (key, name) = name?;
    fields.remove(key);

    let payload = fields
        .into_iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, v)
        })
        .collect();
    Some((name, payload))
}

async fn run(state: &AppState, name: String, payload: Payload) -> Response {
    let runtime = state.runtime();
    detached(async move {
        let result = run_action(&runtime.config.actions, &name, &payload).await;
        (result.ok, result)
    })
    .await
}
