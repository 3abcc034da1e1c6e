// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::{reject, AppState};

/// Wrap each request in an `http_request` span with a fresh request id.
pub async fn trace_request(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %req.method(),
        uri = %req.uri().path(),
    );

    async move {
        info!("request started");
        let response = next.run(req).await;
        info!(status = %response.status(), "request finished");
        response
    }
    .instrument(span)
    .await
}

/// Require `Authorization: Bearer <token>` when the config sets a token.
pub async fn require_token(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let runtime = state.runtime();
    let Some(token) = runtime.config.token.as_deref() else {
        return next.run(req).await;
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented == Some(token) {
        next.run(req).await
    } else {
        tracing::warn!("rejected request with missing or wrong token");
        reject(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}
