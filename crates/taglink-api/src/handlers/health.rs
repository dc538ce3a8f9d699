// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health and metrics handlers.

use axum::{extract::State, http::header, response::IntoResponse, Json};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// Liveness plus the current server connection state. Answers at once
/// while the connection is reconnecting.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = state.conn().is_connected().await;
    Json(HealthResponse::ok(connected, state.uptime_secs()))
}

/// GET /metrics
///
/// Prometheus text exposition of the process registry.
pub async fn prometheus_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        taglink_core::metrics::render(),
    )
}
