// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taglink-api
//!
//! REST API exposing a taglink connection.
//!
//! | Method | Path        | Action                         |
//! |--------|-------------|--------------------------------|
//! | GET    | `/tags`     | read every subscribed tag      |
//! | POST   | `/tag`      | subscribe a JSON array of tags |
//! | GET    | `/tag/{id}` | read one tag                   |
//! | PUT    | `/tag/{id}` | write a JSON scalar            |
//! | DELETE | `/tag/{id}` | unsubscribe                    |
//! | GET    | `/health`   | liveness and connection state  |
//! | GET    | `/metrics`  | Prometheus text                |
//!
//! Errors are returned as `{"error": "<message>"}`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use server::ApiServer;
pub use state::AppState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
