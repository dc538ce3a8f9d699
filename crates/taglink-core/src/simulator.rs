// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-process simulated tag server.
//!
//! [`Simulator`] is both the server and the [`TransportFactory`] handing out
//! handles to it. It serves a fixed namespace:
//!
//! - generated, read-only tags (`numeric.sin.float`, `numeric.saw.float`, ...)
//! - writable registers `storage.numeric.regNN`, `storage.bool.regNN` and
//!   `storage.string.regNN` for `NN` in `01..=10`
//!
//! Outages are modelled with an epoch counter. [`Simulator::go_down`] bumps
//! the epoch, so every session opened before it is severed for good even after
//! [`Simulator::come_up`]; clients must reconnect.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::error::{ConnectionError, TransportError};
use crate::transport::{
    DataSource, GroupHandle, ItemHandle, ReadResult, ServerState, Transport, TransportFactory,
};
use crate::types::{Quality, Value};

/// Default server program id.
pub const DEFAULT_SERVER: &str = "Graybox.Simulator";

/// Default node.
pub const DEFAULT_NODE: &str = "localhost";

/// Tags whose values the simulator generates.
pub const GENERATED_TAGS: &[&str] = &[
    "numeric.sin.int64",
    "numeric.sin.int32",
    "numeric.sin.float",
    "numeric.saw.float",
    "numeric.random.int64",
    "numeric.random.float",
    "boolean.toggle",
    "text.clock",
];

const REGISTER_COUNT: u32 = 10;

// =============================================================================
// Simulator
// =============================================================================

/// Shared simulated server. Clones refer to the same server.
#[derive(Clone)]
pub struct Simulator {
    state: Arc<Mutex<SimState>>,
}

struct SimState {
    server: String,
    nodes: HashSet<String>,
    up: bool,
    epoch: u64,
    fail_connects: u32,
    fail_reads: u32,
    broken_tags: HashSet<String>,
    connects: u64,
    next_handle: u32,
    groups: HashMap<u32, u64>,
    items: HashMap<u32, SimItem>,
    registers: HashMap<String, Value>,
    overrides: HashMap<String, Value>,
    qualities: HashMap<String, i32>,
    started: Instant,
}

struct SimItem {
    group: u32,
    tag: String,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// Creates a simulator for [`DEFAULT_SERVER`] reachable on [`DEFAULT_NODE`].
    pub fn new() -> Self {
        let mut registers = HashMap::new();
        for n in 1..=REGISTER_COUNT {
            registers.insert(format!("storage.numeric.reg{:02}", n), Value::Float(0.0));
            registers.insert(format!("storage.bool.reg{:02}", n), Value::Bool(false));
            registers.insert(format!("storage.string.reg{:02}", n), Value::String(String::new()));
        }

        Self {
            state: Arc::new(Mutex::new(SimState {
                server: DEFAULT_SERVER.to_string(),
                nodes: HashSet::from([DEFAULT_NODE.to_string()]),
                up: true,
                epoch: 0,
                fail_connects: 0,
                fail_reads: 0,
                broken_tags: HashSet::new(),
                connects: 0,
                next_handle: 1,
                groups: HashMap::new(),
                items: HashMap::new(),
                registers,
                overrides: HashMap::new(),
                qualities: HashMap::new(),
                started: Instant::now(),
            })),
        }
    }

    /// Sets the server program id the simulator answers to.
    pub fn with_server(self, server: impl Into<String>) -> Self {
        self.state.lock().server = server.into();
        self
    }

    /// Replaces the set of reachable nodes.
    pub fn with_nodes<I, S>(self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the server program id.
    pub fn server(&self) -> String {
        self.state.lock().server.clone()
    }

    /// Returns every tag the simulator knows, sorted.
    pub fn tag_names(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut tags: Vec<String> = GENERATED_TAGS.iter().map(|t| t.to_string()).collect();
        tags.extend(state.registers.keys().cloned());
        tags.sort();
        tags
    }

    // =========================================================================
    // Fault injection
    // =========================================================================

    /// Severs every open session and refuses new connects.
    pub fn go_down(&self) {
        let mut state = self.state.lock();
        state.up = false;
        state.epoch += 1;
        state.groups.clear();
        state.items.clear();
        tracing::debug!(epoch = state.epoch, "Simulator down");
    }

    /// Accepts connects again. Sessions severed by [`go_down`](Self::go_down)
    /// stay severed.
    pub fn come_up(&self) {
        self.state.lock().up = true;
        tracing::debug!("Simulator up");
    }

    /// Makes the next `n` connect attempts fail.
    pub fn fail_next_connects(&self, n: u32) {
        self.state.lock().fail_connects = n;
    }

    /// Makes the next `n` item reads fail without severing the session.
    pub fn fail_next_reads(&self, n: u32) {
        self.state.lock().fail_reads = n;
    }

    /// Makes every read of `tag` fail while the session stays up.
    pub fn break_tag(&self, tag: &str) {
        self.state.lock().broken_tags.insert(tag.to_string());
    }

    /// Undoes [`break_tag`](Self::break_tag).
    pub fn repair_tag(&self, tag: &str) {
        self.state.lock().broken_tags.remove(tag);
    }

    /// Marks a node as reachable or not.
    pub fn set_node_reachable(&self, node: &str, reachable: bool) {
        let mut state = self.state.lock();
        if reachable {
            state.nodes.insert(node.to_string());
        } else {
            state.nodes.remove(node);
        }
    }

    /// Pins the value of any known tag.
    pub fn set_value(&self, tag: &str, value: impl Into<Value>) {
        self.state.lock().overrides.insert(tag.to_string(), value.into());
    }

    /// Pins the raw quality code reported for a tag.
    pub fn set_quality(&self, tag: &str, quality: i32) {
        self.state.lock().qualities.insert(tag.to_string(), quality);
    }

    /// Number of successful connects so far.
    pub fn connect_count(&self) -> u64 {
        self.state.lock().connects
    }

    /// Number of items subscribed across all live sessions.
    pub fn item_count(&self) -> usize {
        self.state.lock().items.len()
    }
}

impl SimState {
    fn knows(&self, tag: &str) -> bool {
        GENERATED_TAGS.contains(&tag) || self.registers.contains_key(tag)
    }

    fn alive(&self, epoch: u64) -> bool {
        self.up && self.epoch == epoch
    }

    fn allocate(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle = self.next_handle.wrapping_add(1);
        handle
    }

    fn current_value(&self, tag: &str) -> Value {
        if let Some(v) = self.overrides.get(tag) {
            return v.clone();
        }
        if let Some(v) = self.registers.get(tag) {
            return v.clone();
        }
        let t = self.started.elapsed().as_secs_f64();
        match tag {
            "numeric.sin.int64" => Value::Int((t.sin() * 100.0).round() as i64),
            "numeric.sin.int32" => Value::Int((t.sin() * 1000.0).round() as i64),
            "numeric.sin.float" => Value::Float(t.sin() * 100.0),
            "numeric.saw.float" => Value::Float((t % 10.0) * 10.0),
            "numeric.random.int64" => Value::Int(rand::random::<u16>() as i64),
            "numeric.random.float" => Value::Float(rand::random::<f64>() * 100.0),
            "boolean.toggle" => Value::Bool((t as u64) % 2 == 0),
            "text.clock" => Value::String(Utc::now().to_rfc3339()),
            _ => Value::Null,
        }
    }

    fn store(&mut self, tag: &str, value: &Value) -> Result<(), TransportError> {
        let Some(current) = self.registers.get(tag) else {
            return Err(TransportError::BadRights);
        };
        let stored = match (current, value) {
            (Value::Int(_) | Value::Float(_), v) => v.as_f64().map(Value::Float),
            (Value::Bool(_), Value::Bool(_)) | (Value::String(_), Value::String(_)) => {
                Some(value.clone())
            }
            _ => None,
        };
        let stored = stored.ok_or(TransportError::BadType)?;
        self.overrides.remove(tag);
        self.registers.insert(tag.to_string(), stored);
        Ok(())
    }
}

impl TransportFactory for Simulator {
    fn create(&self) -> Result<Box<dyn Transport>, ConnectionError> {
        Ok(Box::new(SimTransport {
            state: Arc::clone(&self.state),
            session: None,
        }))
    }

    fn name(&self) -> &str {
        "simulator"
    }
}

// =============================================================================
// SimTransport
// =============================================================================

struct SimTransport {
    state: Arc<Mutex<SimState>>,
    session: Option<u64>,
}

impl SimTransport {
    fn epoch(&self) -> Result<u64, TransportError> {
        let epoch = self.session.ok_or(TransportError::SessionLost)?;
        if self.state.lock().alive(epoch) {
            Ok(epoch)
        } else {
            Err(TransportError::SessionLost)
        }
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn connect(&mut self, server: &str, node: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.fail_connects > 0 {
            state.fail_connects -= 1;
            return Err(TransportError::Unreachable(node.to_string()));
        }
        if !state.up || !state.nodes.contains(node) {
            return Err(TransportError::Unreachable(node.to_string()));
        }
        if state.server != server {
            return Err(TransportError::UnknownServer(server.to_string()));
        }
        state.connects += 1;
        self.session = Some(state.epoch);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.session = None;
        Ok(())
    }

    async fn server_state(&self) -> Result<ServerState, TransportError> {
        match self.session {
            None => Ok(ServerState::Disconnected),
            Some(_) => self.epoch().map(|_| ServerState::Running),
        }
    }

    async fn create_group(&self) -> Result<GroupHandle, TransportError> {
        let epoch = self.epoch()?;
        let mut state = self.state.lock();
        let handle = state.allocate();
        state.groups.insert(handle, epoch);
        Ok(GroupHandle(handle))
    }

    async fn remove_group(&self, group: GroupHandle) -> Result<(), TransportError> {
        self.epoch()?;
        let mut state = self.state.lock();
        state.groups.remove(&group.0);
        state.items.retain(|_, item| item.group != group.0);
        Ok(())
    }

    async fn add_item(&self, group: GroupHandle, tag: &str) -> Result<ItemHandle, TransportError> {
        self.epoch()?;
        let mut state = self.state.lock();
        if !state.groups.contains_key(&group.0) {
            return Err(TransportError::Other(format!("unknown group {}", group.0)));
        }
        if !state.knows(tag) {
            return Err(TransportError::UnknownItem(tag.to_string()));
        }
        let handle = state.allocate();
        state.items.insert(
            handle,
            SimItem {
                group: group.0,
                tag: tag.to_string(),
            },
        );
        Ok(ItemHandle(handle))
    }

    async fn remove_item(
        &self,
        _group: GroupHandle,
        item: ItemHandle,
    ) -> Result<(), TransportError> {
        self.epoch()?;
        self.state.lock().items.remove(&item.0);
        Ok(())
    }

    async fn read_item(
        &self,
        item: ItemHandle,
        _source: DataSource,
    ) -> Result<ReadResult, TransportError> {
        self.epoch()?;
        let mut state = self.state.lock();
        if state.fail_reads > 0 {
            state.fail_reads -= 1;
            return Err(TransportError::Other("read timed out".into()));
        }
        let tag = state
            .items
            .get(&item.0)
            .map(|i| i.tag.clone())
            .ok_or(TransportError::InvalidHandle(item.0))?;
        if state.broken_tags.contains(&tag) {
            return Err(TransportError::Other(format!("{} unreadable", tag)));
        }
        let quality = state
            .qualities
            .get(&tag)
            .copied()
            .unwrap_or(i32::from(Quality::Good.code()));
        Ok(ReadResult {
            value: state.current_value(&tag),
            quality,
            timestamp: Utc::now(),
        })
    }

    async fn write_item(&self, item: ItemHandle, value: &Value) -> Result<(), TransportError> {
        self.epoch()?;
        let mut state = self.state.lock();
        let tag = state
            .items
            .get(&item.0)
            .map(|i| i.tag.clone())
            .ok_or(TransportError::InvalidHandle(item.0))?;
        state.store(&tag, value)
    }

    fn name(&self) -> &str {
        "simulator"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn connected(sim: &Simulator) -> Box<dyn Transport> {
        let mut t = sim.create().unwrap();
        t.connect(DEFAULT_SERVER, DEFAULT_NODE).await.unwrap();
        t
    }

    #[tokio::test]
    async fn test_connect_rules() {
        let sim = Simulator::new();
        let mut t = sim.create().unwrap();

        assert_eq!(
            t.connect(DEFAULT_SERVER, "nowhere").await,
            Err(TransportError::Unreachable("nowhere".into()))
        );
        assert_eq!(
            t.connect("Other.Server", DEFAULT_NODE).await,
            Err(TransportError::UnknownServer("Other.Server".into()))
        );
        assert_eq!(t.server_state().await, Ok(ServerState::Disconnected));

        t.connect(DEFAULT_SERVER, DEFAULT_NODE).await.unwrap();
        assert_eq!(t.server_state().await, Ok(ServerState::Running));
        assert_eq!(sim.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_outage_severs_session() {
        let sim = Simulator::new();
        let t = connected(&sim).await;

        sim.go_down();
        assert_eq!(t.server_state().await, Err(TransportError::SessionLost));
        sim.come_up();
        assert_eq!(t.server_state().await, Err(TransportError::SessionLost));

        let t = connected(&sim).await;
        assert_eq!(t.server_state().await, Ok(ServerState::Running));
    }

    #[tokio::test]
    async fn test_register_write_rules() {
        let sim = Simulator::new();
        let t = connected(&sim).await;
        let group = t.create_group().await.unwrap();

        let reg = t.add_item(group, "storage.numeric.reg01").await.unwrap();
        t.write_item(reg, &Value::Int(2)).await.unwrap();
        let read = t.read_item(reg, DataSource::Device).await.unwrap();
        assert_eq!(read.value, Value::Float(2.0));

        assert_eq!(
            t.write_item(reg, &Value::String("x".into())).await,
            Err(TransportError::BadType)
        );

        let sin = t.add_item(group, "numeric.sin.float").await.unwrap();
        assert_eq!(
            t.write_item(sin, &Value::Float(1.0)).await,
            Err(TransportError::BadRights)
        );

        assert!(matches!(
            t.add_item(group, "no.such.tag").await,
            Err(TransportError::UnknownItem(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_group_drops_items() {
        let sim = Simulator::new();
        let t = connected(&sim).await;
        let group = t.create_group().await.unwrap();
        t.add_item(group, "numeric.saw.float").await.unwrap();
        t.add_item(group, "boolean.toggle").await.unwrap();
        assert_eq!(sim.item_count(), 2);

        t.remove_group(group).await.unwrap();
        assert_eq!(sim.item_count(), 0);
    }

    #[tokio::test]
    async fn test_quality_override() {
        let sim = Simulator::new();
        let t = connected(&sim).await;
        let group = t.create_group().await.unwrap();
        let item = t.add_item(group, "numeric.sin.float").await.unwrap();

        sim.set_quality("numeric.sin.float", 216);
        let read = t.read_item(item, DataSource::Device).await.unwrap();
        assert_eq!(read.quality, 216);
    }

    #[tokio::test]
    async fn test_broken_tag_keeps_session() {
        let sim = Simulator::new();
        let t = connected(&sim).await;
        let group = t.create_group().await.unwrap();
        let item = t.add_item(group, "text.clock").await.unwrap();

        sim.break_tag("text.clock");
        assert!(t.read_item(item, DataSource::Device).await.is_err());
        assert_eq!(t.server_state().await, Ok(ServerState::Running));

        sim.repair_tag("text.clock");
        assert!(t.read_item(item, DataSource::Device).await.is_ok());
    }

    #[test]
    fn test_namespace() {
        let sim = Simulator::new();
        let tags = sim.tag_names();
        assert_eq!(tags.len(), GENERATED_TAGS.len() + 3 * REGISTER_COUNT as usize);
        assert!(tags.contains(&"storage.string.reg10".to_string()));
    }
}
