// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom request extractors.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::ApiError;

/// Header carrying a caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// Tag Path Extractor
// =============================================================================

/// Tag name taken from the `{id}` path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPath(pub String);

impl<S> FromRequestParts<S> for TagPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(tag) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::tag_not_found())?;

        if tag.trim().is_empty() {
            return Err(ApiError::tag_not_found());
        }

        Ok(TagPath(tag))
    }
}

// =============================================================================
// Request ID Extractor
// =============================================================================

/// Request id from [`REQUEST_ID_HEADER`], or a fresh one.
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub uuid::Uuid);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| uuid::Uuid::parse_str(s.trim()).ok())
            .unwrap_or_else(uuid::Uuid::new_v4);

        Ok(RequestId(id))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
