// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Response bodies.

use serde::{Deserialize, Serialize};

/// `{"result": "..."}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBody {
    /// What happened.
    pub result: String,
}

impl ResultBody {
    fn new(result: &str) -> Self {
        Self {
            result: result.to_string(),
        }
    }

    /// Tags were subscribed.
    pub fn created() -> Self {
        Self::new("created")
    }

    /// A tag was written.
    pub fn updated() -> Self {
        Self::new("updated")
    }

    /// A tag was unsubscribed.
    pub fn deleted() -> Self {
        Self::new("deleted")
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Whether the server connection is up.
    pub connected: bool,
    /// Crate version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn ok(connected: bool, uptime_seconds: u64) -> Self {
        Self {
            status: "ok".to_string(),
            connected,
            version: crate::VERSION.to_string(),
            uptime_seconds,
        }
    }
}
