// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Polling Cache Integration Tests
//!
//! - `test_cache_*`: refresh, lookup and shutdown of [`PollingCache`]

use std::sync::Arc;
use std::time::Duration;

use taglink_core::{PollingCache, Simulator, TagConnection, Value};
use taglink_tests::common::{init_test_logging, simulator_connection, MockConnection};

#[tokio::test]
async fn test_cache_first_read_before_return() {
    init_test_logging();
    let conn: Arc<dyn TagConnection> = Arc::new(MockConnection::fixed(["a", "b", "c"]));

    let cache = PollingCache::sync(conn, Duration::from_secs(60)).await;
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.get("a"), Some(Value::Float(1.0)));
    assert_eq!(cache.get("c"), Some(Value::Float(3.0)));
    assert_eq!(cache.get("missing"), None);
    cache.close().await;
}

#[tokio::test]
async fn test_cache_refreshes_on_interval() {
    init_test_logging();
    let mock = Arc::new(MockConnection::random(["x", "y"]));
    let conn: Arc<dyn TagConnection> = mock.clone();

    let cache = PollingCache::sync(conn, Duration::from_millis(50)).await;
    let first = cache.snapshot();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(mock.read_count() >= 3, "reads: {}", mock.read_count());
    assert_ne!(cache.snapshot(), first);
    cache.close().await;
}

#[tokio::test]
async fn test_cache_values_freeze_after_close() {
    init_test_logging();
    let mock = Arc::new(MockConnection::random(["x"]));
    let conn: Arc<dyn TagConnection> = mock.clone();

    let cache = PollingCache::sync(conn, Duration::from_millis(10)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    cache.close().await;

    let frozen = cache.snapshot();
    let reads = mock.read_count();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(cache.snapshot(), frozen);
    assert_eq!(mock.read_count(), reads);
}

#[tokio::test]
async fn test_cache_close_is_prompt() {
    init_test_logging();
    let conn: Arc<dyn TagConnection> = Arc::new(MockConnection::fixed(["a"]));

    let cache = PollingCache::sync(conn, Duration::from_secs(3600)).await;
    tokio::time::timeout(Duration::from_secs(2), cache.close())
        .await
        .expect("close did not return");

    // A second close, from a clone, returns at once.
    let clone = cache.clone();
    tokio::time::timeout(Duration::from_millis(100), clone.close())
        .await
        .expect("second close blocked");
}

#[tokio::test]
async fn test_cache_keeps_last_values_while_disconnected() {
    init_test_logging();
    let mock = Arc::new(MockConnection::fall_asleep(2, ["a", "b"]));
    let conn: Arc<dyn TagConnection> = mock.clone();

    let cache = PollingCache::sync(conn, Duration::from_millis(10)).await;
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(mock.read_count() > 2);
    assert_eq!(cache.get("a"), Some(Value::Float(1.0)));
    assert_eq!(cache.get("b"), Some(Value::Float(2.0)));
    cache.close().await;
}

#[tokio::test]
async fn test_cache_fills_once_connection_wakes() {
    init_test_logging();
    let mock = Arc::new(MockConnection::wake_up(3, ["a"]));
    let conn: Arc<dyn TagConnection> = mock.clone();

    let cache = PollingCache::sync(conn, Duration::from_millis(10)).await;
    assert!(cache.is_empty());

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(cache.get("a"), Some(Value::Float(1.0)));
    cache.close().await;
}

#[tokio::test]
async fn test_cache_over_simulator() {
    init_test_logging();
    let sim = Simulator::new();
    let conn = simulator_connection(&sim, &["storage.numeric.reg04", "boolean.toggle"]).await;

    let cache = PollingCache::sync(conn.clone(), Duration::from_millis(20)).await;
    assert_eq!(cache.get("storage.numeric.reg04"), Some(Value::Float(0.0)));

    conn.write("storage.numeric.reg04", Value::Float(7.0))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(cache.get("storage.numeric.reg04"), Some(Value::Float(7.0)));
    cache.close().await;
    conn.close().await;
}

#[tokio::test]
async fn test_cache_fills_past_unreadable_tag() {
    init_test_logging();
    let sim = Simulator::new();
    let tags = ["boolean.toggle", "numeric.sin.float", "text.clock"];
    let conn = simulator_connection(&sim, &tags).await;
    sim.break_tag("boolean.toggle");

    let cache = PollingCache::sync(conn, Duration::from_millis(5)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(cache.get("numeric.sin.float").is_some());
    assert!(cache.get("text.clock").is_some());
    assert_eq!(sim.connect_count(), 1);
    cache.close().await;
}
