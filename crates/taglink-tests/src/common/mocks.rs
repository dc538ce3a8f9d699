// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Connections
//!
//! Scripted [`TagConnection`] implementations for testing caches and
//! observers without a server.
//!
//! | Mode         | Values                              | Connected           |
//! |--------------|-------------------------------------|---------------------|
//! | `Static`     | position in the tag list plus one   | always              |
//! | `Random`     | uniform in `0.0..100.0`, every read | always              |
//! | `WakeUp`     | static, after `n` reads             | after `n` reads     |
//! | `FallAsleep` | static, for the first `n` reads     | for `n` reads       |

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use taglink_core::{Item, Quality, TagConnection, TagError, TagResult, Value};

// =============================================================================
// MockMode
// =============================================================================

/// How a [`MockConnection`] produces values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// Fixed values.
    Static,
    /// A fresh random value on every read.
    Random,
    /// Disconnected until `n` reads have been served.
    WakeUp(u64),
    /// Connected for the first `n` reads only.
    FallAsleep(u64),
}

// =============================================================================
// MockConnection
// =============================================================================

/// A configurable in-memory tag connection.
#[derive(Debug)]
pub struct MockConnection {
    mode: MockMode,
    tags: Mutex<Vec<String>>,
    written: Mutex<HashMap<String, Value>>,
    reads: AtomicU64,
    writes: AtomicU64,
    closed: AtomicBool,
}

impl MockConnection {
    /// Creates a mock with `tags` subscribed.
    pub fn new<I, S>(mode: MockMode, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode,
            tags: Mutex::new(tags.into_iter().map(Into::into).collect()),
            written: Mutex::new(HashMap::new()),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Fixed values: the n-th tag reads `n + 1.0`.
    pub fn fixed<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(MockMode::Static, tags)
    }

    /// Random values on every read.
    pub fn random<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(MockMode::Random, tags)
    }

    /// Reads fail until `after` reads have been attempted.
    pub fn wake_up<I, S>(after: u64, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(MockMode::WakeUp(after), tags)
    }

    /// Reads fail once `after` reads have been served.
    pub fn fall_asleep<I, S>(after: u64, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(MockMode::FallAsleep(after), tags)
    }

    /// Number of read calls, single-tag reads included.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of accepted writes.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns `true` once `close` was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn awake(&self, reads: u64) -> bool {
        if self.is_closed() {
            return false;
        }
        match self.mode {
            MockMode::Static | MockMode::Random => true,
            MockMode::WakeUp(after) => reads >= after,
            MockMode::FallAsleep(after) => reads < after,
        }
    }

    fn value_of(&self, index: usize, tag: &str) -> Value {
        if let Some(v) = self.written.lock().get(tag) {
            return v.clone();
        }
        match self.mode {
            MockMode::Random => Value::Float(rand::thread_rng().gen_range(0.0..100.0)),
            _ => Value::Float(index as f64 + 1.0),
        }
    }

    fn item(&self, index: usize, tag: &str) -> Item {
        Item::new(self.value_of(index, tag), Quality::Good, Utc::now())
    }
}

#[async_trait]
impl TagConnection for MockConnection {
    async fn add(&self, tags: &[&str]) -> TagResult<()> {
        let mut current = self.tags.lock();
        for tag in tags {
            if !current.iter().any(|t| t == tag) {
                current.push(tag.to_string());
            }
        }
        Ok(())
    }

    async fn remove(&self, tag: &str) {
        self.tags.lock().retain(|t| t != tag);
    }

    async fn read(&self) -> HashMap<String, Item> {
        let reads = self.reads.fetch_add(1, Ordering::SeqCst);
        if !self.awake(reads) {
            return HashMap::new();
        }
        let tags = self.tags.lock().clone();
        tags.iter()
            .enumerate()
            .map(|(i, tag)| (tag.clone(), self.item(i, tag)))
            .collect()
    }

    async fn read_item(&self, tag: &str) -> Item {
        let reads = self.reads.fetch_add(1, Ordering::SeqCst);
        if !self.awake(reads) {
            return Item::empty();
        }
        let index = self.tags.lock().iter().position(|t| t == tag);
        match index {
            Some(i) => self.item(i, tag),
            None => Item::empty(),
        }
    }

    async fn write(&self, tag: &str, value: Value) -> TagResult<()> {
        if !self.tags.lock().iter().any(|t| t == tag) {
            return Err(TagError::not_found(tag));
        }
        self.written.lock().insert(tag.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!(reads = self.read_count(), mode = ?self.mode, "Mock connection closed");
    }

    async fn tags(&self) -> Vec<String> {
        self.tags.lock().clone()
    }

    async fn is_connected(&self) -> bool {
        self.awake(self.read_count())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_values_follow_position() {
        let conn = MockConnection::fixed(["a", "b"]);
        let items = conn.read().await;
        assert_eq!(items["a"].value, Value::Float(1.0));
        assert_eq!(items["b"].value, Value::Float(2.0));
        assert_eq!(conn.read_count(), 1);
    }

    #[tokio::test]
    async fn test_wake_up() {
        let conn = MockConnection::wake_up(2, ["a"]);
        assert!(conn.read_item("a").await.is_empty());
        assert!(conn.read_item("a").await.is_empty());
        assert_eq!(conn.read_item("a").await.value, Value::Float(1.0));
    }

    #[tokio::test]
    async fn test_fall_asleep() {
        let conn = MockConnection::fall_asleep(1, ["a"]);
        assert_eq!(conn.read().await.len(), 1);
        assert!(conn.read().await.is_empty());
        assert!(!conn.is_connected().await);
    }

    #[tokio::test]
    async fn test_write_unknown_tag() {
        let conn = MockConnection::fixed(["a"]);
        assert!(conn.write("zzz", Value::Int(1)).await.is_err());
        conn.write("a", Value::Int(7)).await.unwrap();
        assert_eq!(conn.read_item("a").await.value, Value::Int(7));
    }
}
