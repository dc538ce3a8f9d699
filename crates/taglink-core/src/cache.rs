// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Polling cache of tag values.
//!
//! [`PollingCache::sync`] reads the full tag set once, then keeps re-reading
//! it on a fixed interval in a background task. Readers call
//! [`PollingCache::get`] concurrently without touching the connection.
//!
//! Every read is merged per tag: a tag missing from one pass keeps its last
//! known value.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::{Instant, MissedTickBehavior};

use crate::connection::TagConnection;
use crate::control::Closer;
use crate::types::{Item, Value};

/// Smallest accepted polling interval.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Tag values refreshed from a connection in the background.
#[derive(Debug, Clone)]
pub struct PollingCache {
    values: Arc<RwLock<HashMap<String, Value>>>,
    closer: Closer,
}

impl PollingCache {
    /// Populates the cache with one read, then refreshes it every `interval`.
    ///
    /// The first read completes before this returns, so `get` is meaningful
    /// immediately.
    pub async fn sync(conn: Arc<dyn TagConnection>, interval: Duration) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        let values = Arc::new(RwLock::new(HashMap::new()));
        merge(&values, conn.read().await);

        let shared = Arc::clone(&values);
        let closer = Closer::spawn(move |mut stop| async move {
            tracing::debug!(interval_ms = interval.as_millis() as u64, "Polling cache started");

            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop => break,
                    _ = ticker.tick() => {
                        merge(&shared, conn.read().await);
                    }
                }
            }

            tracing::debug!("Polling cache stopped");
        });

        Self { values, closer }
    }

    /// Returns the last known value of a tag.
    pub fn get(&self, tag: &str) -> Option<Value> {
        self.values.read().get(tag).cloned()
    }

    /// Returns a copy of every cached value.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.values.read().clone()
    }

    /// Number of cached tags.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Returns the stop handle of the refresh task.
    pub fn closer(&self) -> Closer {
        self.closer.clone()
    }

    /// Stops refreshing and waits for the refresh task to exit.
    pub async fn close(&self) {
        self.closer.close().await;
    }
}

fn merge(values: &RwLock<HashMap<String, Value>>, items: HashMap<String, Item>) {
    if items.is_empty() {
        return;
    }
    let mut values = values.write();
    for (tag, item) in items {
        values.insert(tag, item.value);
    }
}

// =============================================================================
// Tests
// =============================================================================
