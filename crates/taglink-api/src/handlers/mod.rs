// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - tags: read, subscribe, write and unsubscribe
//! - health: liveness and Prometheus metrics

mod health;
mod tags;

pub use health::*;
pub use tags::*;
