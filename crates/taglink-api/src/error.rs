// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every error renders as `{"error": "<message>"}` with the matching status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taglink_core::{OperationError, TagError};
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned for an unknown or unsubscribed tag.
pub const TAG_NOT_FOUND: &str = "tag not found";

/// Message returned when a subscription request fails.
pub const DID_NOT_ADD_TAGS: &str = "Did not add tags";

/// Message returned for a body that cannot be decoded.
pub const INVALID_PAYLOAD: &str = "Invalid request payload";

/// Message returned for writes while the API is read-only.
pub const READ_ONLY: &str = "read-only";

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("Not found: {message}")]
    NotFound {
        /// Error message.
        message: String,
    },

    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// The server behind the connection failed the request (502).
    #[error("Bad gateway: {message}")]
    BadGateway {
        /// Error message.
        message: String,
    },

    /// No connection to the server (503).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a bad gateway error.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::BadGateway {
            message: message.into(),
        }
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Tag is not subscribed.
    pub fn tag_not_found() -> Self {
        Self::not_found(TAG_NOT_FOUND)
    }

    /// Body could not be decoded.
    pub fn invalid_payload() -> Self {
        Self::bad_request(INVALID_PAYLOAD)
    }

    /// Writes are disabled.
    pub fn read_only() -> Self {
        Self::bad_request(READ_ONLY)
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::BadGateway { .. } => "BAD_GATEWAY",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Message placed in the response body.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { message }
            | ApiError::BadRequest { message }
            | ApiError::BadGateway { message }
            | ApiError::ServiceUnavailable { message } => message.clone(),
            ApiError::Internal { .. } => "internal error".to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorBody {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<TagError> for ApiError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::Operation(OperationError::NotFound { .. }) => ApiError::tag_not_found(),
            TagError::Operation(e) => ApiError::bad_gateway(e.to_string()),
            TagError::Subscribe(_) => ApiError::bad_request(DID_NOT_ADD_TAGS),
            TagError::Connection(e) => ApiError::service_unavailable(e.to_string()),
            TagError::Transport(e) => ApiError::bad_gateway(e.to_string()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use taglink_core::{SubscribeError, TransportError};

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::tag_not_found().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::read_only().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::bad_gateway("x").status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::internal("crash").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_message_hidden() {
        assert_eq!(ApiError::internal("db exploded").user_message(), "internal error");
        assert_eq!(ApiError::read_only().user_message(), "read-only");
    }

    #[test]
    fn test_from_tag_error() {
        let err: ApiError = TagError::not_found("a.b").into();
        assert_eq!(err.user_message(), TAG_NOT_FOUND);

        let err: ApiError = TagError::from(SubscribeError {
            failures: vec![("x".into(), "unknown item".into())],
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), DID_NOT_ADD_TAGS);

        let err: ApiError = TagError::from(OperationError::WriteFailed {
            tag: "a.b".into(),
            source: TransportError::BadRights,
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err: ApiError = TagError::not_connected().into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
