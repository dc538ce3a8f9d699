// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taglink Integration Tests
//!
//! Integration tests for the taglink tag client, plus the test utilities
//! they share.
//!
//! ## Module Structure
//!
//! - [`common`]: logging setup, connection fixtures and mock connections
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p taglink-tests
//!
//! # Run specific test suite
//! cargo test -p taglink-tests --test integration_connection
//! cargo test -p taglink-tests --test integration_cache
//! cargo test -p taglink-tests --test integration_observer
//! cargo test -p taglink-tests --test integration_api
//! cargo test -p taglink-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! ### Connection Tests (`integration_connection.rs`)
//! - Node failover and connect errors
//! - Subscribe, read and write against the simulator
//! - Reconnect and re-subscribe after the server goes away
//!
//! ### Cache Tests (`integration_cache.rs`)
//! - Refresh interval and shutdown behavior
//!
//! ### Observer Tests (`integration_observer.rs`)
//! - Change and value triggers
//! - Closing individual observations
//!
//! ### API Tests (`integration_api.rs`)
//! - Every REST route, status codes and bodies
//!
//! ### Config Tests (`integration_config.rs`)
//! - Loading files in every format, placeholders and validation

pub mod common;
