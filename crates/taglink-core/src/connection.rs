// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Self-healing tag connection.
//!
//! [`Connection`] composes a [`Session`] and its [`TagRegistry`] behind one
//! async mutex. Every operation, including reconnection, holds that lock for
//! its whole duration, so no call ever runs against a torn-down registry.
//!
//! # Self-heal
//!
//! A failed read is treated as a liveness probe. If the session no longer
//! reports a running server, the connection:
//!
//! 1. captures the subscribed tag set,
//! 2. closes the stale registry,
//! 3. retries [`Session::try_connect`] over all nodes, sleeping `heal_delay`
//!    between attempts, with no retry cap,
//! 4. re-subscribes the captured tags in one `add`.
//!
//! The caller of the failed read receives an empty item (or the partial map
//! collected so far) and the next call runs against the new session.
//!
//! A full [`read`](TagConnection::read) stops at the first failing tag. Each
//! pass starts one tag further along, so a single unreadable tag cannot hide
//! the tags after it.
//!
//! While a reconnect holds the lock, [`is_connected`](TagConnection::is_connected)
//! answers from a liveness flag instead of waiting.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{OperationError, TagError, TagResult};
use crate::metrics::TagMetricsCollector;
use crate::registry::TagRegistry;
use crate::session::Session;
use crate::simulator::{DEFAULT_NODE, DEFAULT_SERVER};
use crate::transport::{DataSource, ItemHandle, Transport, TransportFactory};
use crate::types::{Item, Value};

/// Default delay between reconnect attempts.
pub const DEFAULT_HEAL_DELAY: Duration = Duration::from_millis(100);

// =============================================================================
// TagConnection
// =============================================================================

/// The capability set every tag connection offers.
///
/// The polling cache, the change observer and the REST layer only depend on
/// this trait.
#[async_trait]
pub trait TagConnection: Send + Sync {
    /// Subscribes tags. Per-tag failures are aggregated.
    async fn add(&self, tags: &[&str]) -> TagResult<()>;

    /// Unsubscribes a tag. Unknown tags are ignored.
    async fn remove(&self, tag: &str);

    /// Reads every subscribed tag.
    async fn read(&self) -> HashMap<String, Item>;

    /// Reads one tag. Unknown or failed tags yield [`Item::empty`].
    async fn read_item(&self, tag: &str) -> Item;

    /// Writes a subscribed tag.
    async fn write(&self, tag: &str, value: Value) -> TagResult<()>;

    /// Releases the connection.
    async fn close(&self);

    /// Returns the subscribed tags.
    async fn tags(&self) -> Vec<String>;

    /// Returns `true` while the server reports a running state.
    async fn is_connected(&self) -> bool;
}

// =============================================================================
// ConnectionStats
// =============================================================================

/// Counters for one connection.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    reads: AtomicU64,
    read_errors: AtomicU64,
    writes: AtomicU64,
    write_errors: AtomicU64,
    heals: AtomicU64,
    heal_attempts: AtomicU64,
}

impl ConnectionStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    fn record_read(&self, success: bool) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.read_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_write(&self, success: bool) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.write_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_heal(&self, attempts: u64) {
        self.heals.fetch_add(1, Ordering::Relaxed);
        self.heal_attempts.fetch_add(attempts, Ordering::Relaxed);
    }

    /// Total item reads.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Failed item reads.
    pub fn read_errors(&self) -> u64 {
        self.read_errors.load(Ordering::Relaxed)
    }

    /// Total item writes.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Failed item writes.
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    /// Completed reconnections.
    pub fn heals(&self) -> u64 {
        self.heals.load(Ordering::Relaxed)
    }

    /// Connect attempts spent in reconnections.
    pub fn heal_attempts(&self) -> u64 {
        self.heal_attempts.load(Ordering::Relaxed)
    }
}

// =============================================================================
// ConnectionBuilder
// =============================================================================

/// Builder for [`Connection`].
#[derive(Debug, Clone)]
pub struct ConnectionBuilder {
    server: String,
    nodes: Vec<String>,
    tags: Vec<String>,
    heal_delay: Duration,
    metrics: bool,
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            nodes: vec![DEFAULT_NODE.to_string()],
            tags: Vec::new(),
            heal_delay: DEFAULT_HEAL_DELAY,
            metrics: true,
        }
    }
}

impl ConnectionBuilder {
    /// Sets the server program id.
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Sets the candidate nodes, tried in order.
    pub fn nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the tags subscribed right after connecting.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the delay between reconnect attempts.
    pub fn heal_delay(mut self, delay: Duration) -> Self {
        self.heal_delay = delay;
        self
    }

    /// Enables or disables Prometheus metrics.
    pub fn metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled;
        self
    }

    /// Connects and subscribes the initial tags.
    ///
    /// Fails if no node accepts the connection or any initial tag cannot be
    /// subscribed.
    pub async fn connect(self, factory: Arc<dyn TransportFactory>) -> TagResult<Connection> {
        let mut session = Session::new(factory);
        let mut registry = session.try_connect(&self.server, &self.nodes).await?;

        let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        let added = match session.transport() {
            Some(transport) => {
                let result = registry.add(transport, &tags).await;
                if result.is_err() {
                    registry.close(transport).await;
                }
                result
            }
            None => Err(TagError::not_connected()),
        };
        if let Err(e) = added {
            session.close().await;
            return Err(e);
        }

        let metrics = TagMetricsCollector::new(self.metrics);
        metrics.set_subscribed(registry.len());

        Ok(Connection {
            server: self.server,
            nodes: self.nodes,
            heal_delay: self.heal_delay,
            inner: Mutex::new(Inner {
                session,
                registry: Some(registry),
                cursor: 0,
            }),
            live: AtomicBool::new(true),
            stats: ConnectionStats::new(),
            metrics,
        })
    }
}

// =============================================================================
// Connection
// =============================================================================

/// A tag connection that reconnects and re-subscribes on its own.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use taglink_core::{Connection, Simulator, TagConnection};
///
/// # async fn demo() -> taglink_core::TagResult<()> {
/// let conn = Connection::builder()
///     .server("Graybox.Simulator")
///     .nodes(["localhost"])
///     .tags(["numeric.sin.float"])
///     .connect(Arc::new(Simulator::new()))
///     .await?;
///
/// let item = conn.read_item("numeric.sin.float").await;
/// println!("{item}");
/// conn.close().await;
/// # Ok(())
/// # }
/// ```
pub struct Connection {
    server: String,
    nodes: Vec<String>,
    heal_delay: Duration,
    inner: Mutex<Inner>,
    live: AtomicBool,
    stats: ConnectionStats,
    metrics: TagMetricsCollector,
}

struct Inner {
    session: Session,
    registry: Option<TagRegistry>,
    /// Start offset of the next full read.
    cursor: usize,
}

impl Inner {
    fn parts(&mut self) -> Option<(&dyn Transport, &mut TagRegistry)> {
        let transport = self.session.transport()?;
        let registry = self.registry.as_mut()?;
        Some((transport, registry))
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("server", &self.server)
            .field("nodes", &self.nodes)
            .field("heal_delay", &self.heal_delay)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Returns a builder with the default server and node.
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::default()
    }

    /// Returns the server program id.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Returns the candidate nodes.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Returns the node of the current session.
    pub async fn node(&self) -> Option<String> {
        self.inner.lock().await.session.node().map(str::to_string)
    }

    /// Returns the connection counters.
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    async fn read_one(
        &self,
        transport: &dyn Transport,
        tag: &str,
        handle: ItemHandle,
    ) -> Option<Item> {
        let start = Instant::now();
        let result = transport.read_item(handle, DataSource::Device).await;
        let success = result.is_ok();
        self.stats.record_read(success);
        self.metrics.record_read(success, start.elapsed().as_secs_f64());

        match result {
            Ok(raw) => Some(raw.into()),
            Err(source) => {
                TagError::from(OperationError::ReadFailed {
                    tag: tag.to_string(),
                    source,
                })
                .log("read");
                None
            }
        }
    }

    /// Reconnects and restores the tag set if the session is gone.
    async fn heal(&self, inner: &mut Inner) {
        if inner.session.is_connected().await {
            return;
        }
        self.live.store(false, Ordering::Release);

        let tags = inner
            .registry
            .as_ref()
            .map(TagRegistry::tags)
            .unwrap_or_default();
        if let Some(mut stale) = inner.registry.take() {
            if let Some(transport) = inner.session.transport() {
                stale.close(transport).await;
            }
        }

        tracing::warn!(
            server = %self.server,
            tags = tags.len(),
            "Session lost, reconnecting"
        );

        let mut attempts: u64 = 0;
        let registry = loop {
            attempts += 1;
            match inner.session.try_connect(&self.server, &self.nodes).await {
                Ok(registry) => break registry,
                Err(e) => {
                    tracing::debug!(attempt = attempts, error = %e, "Reconnect attempt failed");
                    tokio::time::sleep(self.heal_delay).await;
                }
            }
        };
        inner.registry = Some(registry);

        if let Some((transport, registry)) = inner.parts() {
            let refs: Vec<&str> = tags.iter().map(String::as_str).collect();
            if let Err(e) = registry.add(transport, &refs).await {
                e.log("heal");
            }
            self.metrics.set_subscribed(registry.len());
        }

        self.live.store(true, Ordering::Release);
        self.stats.record_heal(attempts);
        self.metrics.record_heal();
        tracing::info!(
            server = %self.server,
            node = inner.session.node().unwrap_or_default(),
            attempts = attempts,
            "Connection restored"
        );
    }
}

#[async_trait]
impl TagConnection for Connection {
    async fn add(&self, tags: &[&str]) -> TagResult<()> {
        let mut inner = self.inner.lock().await;
        let (transport, registry) = inner.parts().ok_or_else(TagError::not_connected)?;
        let result = registry.add(transport, tags).await;
        self.metrics.set_subscribed(registry.len());
        result
    }

    async fn remove(&self, tag: &str) {
        let mut inner = self.inner.lock().await;
        if let Some((transport, registry)) = inner.parts() {
            registry.remove(transport, tag).await;
            self.metrics.set_subscribed(registry.len());
        }
    }

    async fn read(&self) -> HashMap<String, Item> {
        let mut inner = self.inner.lock().await;
        let mut items = HashMap::new();

        let start = inner.cursor;
        inner.cursor = inner.cursor.wrapping_add(1);

        let mut failed = false;
        if let Some((transport, registry)) = inner.parts() {
            let mut entries = registry.entries();
            if !entries.is_empty() {
                let len = entries.len();
                entries.rotate_left(start % len);
            }
            for (tag, handle) in entries {
                match self.read_one(transport, &tag, handle).await {
                    Some(item) => {
                        items.insert(tag, item);
                    }
                    None => {
                        failed = true;
                        break;
                    }
                }
            }
        }

        if failed {
            self.heal(&mut inner).await;
        }
        items
    }

    async fn read_item(&self, tag: &str) -> Item {
        let mut inner = self.inner.lock().await;

        let item = match inner.parts() {
            Some((transport, registry)) => match registry.handle(tag) {
                Some(handle) => self.read_one(transport, tag, handle).await,
                None => {
                    tracing::debug!(tag = %tag, "Read of unknown tag");
                    return Item::empty();
                }
            },
            None => return Item::empty(),
        };

        match item {
            Some(item) => item,
            None => {
                self.heal(&mut inner).await;
                Item::empty()
            }
        }
    }

    async fn write(&self, tag: &str, value: Value) -> TagResult<()> {
        let mut inner = self.inner.lock().await;
        let handle = inner
            .parts()
            .and_then(|(_, registry)| registry.handle(tag))
            .ok_or_else(|| TagError::not_found(tag))?;
        let transport = inner.session.transport().ok_or_else(TagError::not_connected)?;

        let result = transport.write_item(handle, &value).await;
        self.stats.record_write(result.is_ok());
        self.metrics.record_write(result.is_ok());

        result.map_err(|source| {
            OperationError::WriteFailed {
                tag: tag.to_string(),
                source,
            }
            .into()
        })
    }

    async fn close(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(mut registry) = inner.registry.take() {
            if let Some(transport) = inner.session.transport() {
                registry.close(transport).await;
            }
        }
        inner.session.close().await;
        self.live.store(false, Ordering::Release);
        self.metrics.set_subscribed(0);
        tracing::info!(server = %self.server, "Connection closed");
    }

    async fn tags(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner.registry.as_ref().map(TagRegistry::tags).unwrap_or_default()
    }

    async fn is_connected(&self) -> bool {
        match self.inner.try_lock() {
            Ok(inner) => inner.session.is_connected().await,
            Err(_) => self.live.load(Ordering::Acquire),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
