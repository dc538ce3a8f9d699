// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Common Test Utilities
//!
//! - `mocks`: scripted [`TagConnection`] implementations
//! - connection fixtures backed by the in-process simulator

pub mod mocks;

pub use mocks::*;

use std::sync::{Arc, Once};
use std::time::Duration;

use taglink_core::{Connection, Simulator, TagConnection};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize test logging. Call this at the start of each test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,taglink=debug")),
            )
            .with_test_writer()
            .init();
    });
}

/// Reconnect pause used by fixtures, short enough to keep tests fast.
pub const TEST_HEAL_DELAY: Duration = Duration::from_millis(10);

/// Connects to `sim` with `tags` subscribed and metrics disabled.
pub async fn connect_simulator(sim: &Simulator, tags: &[&str]) -> Arc<Connection> {
    let conn = Connection::builder()
        .tags(tags.iter().copied())
        .heal_delay(TEST_HEAL_DELAY)
        .metrics(false)
        .connect(Arc::new(sim.clone()))
        .await
        .expect("Failed to connect to simulator");
    Arc::new(conn)
}

/// Same as [`connect_simulator`], typed as a trait object.
pub async fn simulator_connection(sim: &Simulator, tags: &[&str]) -> Arc<dyn TagConnection> {
    connect_simulator(sim, tags).await
}

/// Receives `n` signals or panics after `timeout`.
pub async fn expect_signals(
    rx: &mut tokio::sync::mpsc::Receiver<bool>,
    n: usize,
    timeout: Duration,
) {
    let received = tokio::time::timeout(timeout, async {
        for _ in 0..n {
            if rx.recv().await.is_none() {
                return false;
            }
        }
        true
    })
    .await;

    match received {
        Ok(true) => {}
        Ok(false) => panic!("Channel closed before {} signals arrived", n),
        Err(_) => panic!("Timed out waiting for {} signals", n),
    }
}
