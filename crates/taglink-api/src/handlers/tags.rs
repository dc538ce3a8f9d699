// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Tag handlers.

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use taglink_core::{Item, Value};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{RequestId, TagPath};
use crate::response::ResultBody;
use crate::state::AppState;

/// GET /tags
///
/// Reads every subscribed tag. An empty subscription yields `{}`.
pub async fn list_tags(State(state): State<AppState>) -> Json<HashMap<String, Item>> {
    Json(state.conn().read().await)
}

/// POST /tag
///
/// Subscribes the tags in a JSON array of names.
pub async fn create_tags(
    State(state): State<AppState>,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(tags) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected tag payload");
        ApiError::invalid_payload()
    })?;

    let names: Vec<&str> = tags.iter().map(String::as_str).collect();
    state.conn().add(&names).await.map_err(|e| {
        e.log("add via API");
        ApiError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(ResultBody::created())))
}

/// GET /tag/{id}
///
/// Reads one tag. Unknown tags and tags without a value are not found.
pub async fn get_tag(
    State(state): State<AppState>,
    TagPath(tag): TagPath,
) -> ApiResult<Json<Item>> {
    let item = state.conn().read_item(&tag).await;
    if item.is_empty() {
        return Err(ApiError::tag_not_found());
    }
    Ok(Json(item))
}

/// PUT /tag/{id}
///
/// Writes a JSON scalar to a subscribed tag.
pub async fn update_tag(
    State(state): State<AppState>,
    request_id: RequestId,
    TagPath(tag): TagPath,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> ApiResult<Json<ResultBody>> {
    if state.read_only {
        return Err(ApiError::read_only());
    }

    let Json(json) = payload.map_err(|_| ApiError::invalid_payload())?;
    let value = Value::from_json(&json)
        .filter(|v| !v.is_null())
        .ok_or_else(ApiError::invalid_payload)?;

    tracing::info!(request_id = %request_id, tag = %tag, value = %value, "Write requested");

    state.conn().write(&tag, value).await.map_err(|e| {
        e.log("write via API");
        ApiError::from(e)
    })?;

    Ok(Json(ResultBody::updated()))
}

/// DELETE /tag/{id}
///
/// Unsubscribes a tag. Removing an unknown tag succeeds.
pub async fn delete_tag(
    State(state): State<AppState>,
    TagPath(tag): TagPath,
) -> Json<ResultBody> {
    state.conn().remove(&tag).await;
    Json(ResultBody::deleted())
}
