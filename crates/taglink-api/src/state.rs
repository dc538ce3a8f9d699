// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Instant;

use taglink_core::TagConnection;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Connection serving every tag operation.
    pub conn: Arc<dyn TagConnection>,
    /// Rejects writes when set.
    pub read_only: bool,
    /// When the state was created.
    pub started: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Creates state over `conn` with writes enabled.
    pub fn new(conn: Arc<dyn TagConnection>) -> Self {
        Self {
            conn,
            read_only: false,
            started: Instant::now(),
        }
    }

    /// Enables or disables writes.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Returns the connection.
    pub fn conn(&self) -> &dyn TagConnection {
        self.conn.as_ref()
    }

    /// Seconds since the state was created.
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
