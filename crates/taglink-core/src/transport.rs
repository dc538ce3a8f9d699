// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Transport abstraction over the remote automation binding.
//!
//! A [`Transport`] is one physical handle to the tag server. The wire
//! encoding lives behind it; this crate only drives the calls. Handles are
//! produced by a [`TransportFactory`], which the process initialises once at
//! start and shuts down once at exit.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConnectionError, TransportError};
use crate::types::{Item, Quality, Value};

// =============================================================================
// ServerState
// =============================================================================

/// State reported by the tag server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerState {
    /// Server is running normally.
    Running,

    /// Server failed.
    Failed,

    /// Server has no configuration loaded.
    NoConfig,

    /// Server is suspended.
    Suspended,

    /// Server is in test mode.
    Test,

    /// No server is attached to the handle.
    #[default]
    Disconnected,
}

impl ServerState {
    /// Decodes the numeric state reported by the server.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Running),
            2 => Some(Self::Failed),
            3 => Some(Self::NoConfig),
            4 => Some(Self::Suspended),
            5 => Some(Self::Test),
            6 => Some(Self::Disconnected),
            _ => None,
        }
    }

    /// Returns the numeric state code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Running => 1,
            Self::Failed => 2,
            Self::NoConfig => 3,
            Self::Suspended => 4,
            Self::Test => 5,
            Self::Disconnected => 6,
        }
    }

    /// Returns `true` if the server is running.
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Failed => write!(f, "Failed"),
            Self::NoConfig => write!(f, "NoConfig"),
            Self::Suspended => write!(f, "Suspended"),
            Self::Test => write!(f, "Test"),
            Self::Disconnected => write!(f, "Disconnected"),
        }
    }
}

// =============================================================================
// DataSource
// =============================================================================

/// Where the server takes a read value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Server-side cache.
    Cache,

    /// The device itself.
    #[default]
    Device,
}

impl DataSource {
    /// Returns the numeric source code.
    pub fn code(&self) -> i16 {
        match self {
            Self::Cache => 1,
            Self::Device => 2,
        }
    }
}

// =============================================================================
// Handles
// =============================================================================

/// Server-side handle of an item group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupHandle(pub u32);

/// Server-side handle of one subscribed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemHandle(pub u32);

impl fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// ReadResult
// =============================================================================

/// Raw result of one item read as reported by the binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResult {
    /// The value read.
    pub value: Value,

    /// Quality code as the binding reports it (may exceed 16 bits).
    pub quality: i32,

    /// Source timestamp.
    pub timestamp: DateTime<Utc>,
}

impl ReadResult {
    /// Creates a good-quality result stamped now.
    pub fn good(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            quality: i32::from(Quality::Good.code()),
            timestamp: Utc::now(),
        }
    }
}

impl From<ReadResult> for Item {
    fn from(r: ReadResult) -> Self {
        Item {
            value: r.value,
            quality: Quality::from_wide(r.quality),
            timestamp: r.timestamp,
        }
    }
}

// =============================================================================
// Transport
// =============================================================================

/// One physical handle to a tag server.
///
/// `connect` and `disconnect` change the handle and take `&mut self`; every
/// other call works on an established session.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connects to `server` on `node`.
    async fn connect(&mut self, server: &str, node: &str) -> Result<(), TransportError>;

    /// Drops the current session. Succeeds when nothing is connected.
    async fn disconnect(&mut self) -> Result<(), TransportError>;

    /// Queries the live server state.
    async fn server_state(&self) -> Result<ServerState, TransportError>;

    /// Creates the item group that holds this session's subscriptions.
    async fn create_group(&self) -> Result<GroupHandle, TransportError>;

    /// Releases an item group and all items in it.
    async fn remove_group(&self, group: GroupHandle) -> Result<(), TransportError>;

    /// Subscribes one tag in `group`.
    async fn add_item(&self, group: GroupHandle, tag: &str) -> Result<ItemHandle, TransportError>;

    /// Releases one subscribed item.
    async fn remove_item(&self, group: GroupHandle, item: ItemHandle)
        -> Result<(), TransportError>;

    /// Reads one item.
    async fn read_item(
        &self,
        item: ItemHandle,
        source: DataSource,
    ) -> Result<ReadResult, TransportError>;

    /// Writes one item.
    async fn write_item(&self, item: ItemHandle, value: &Value) -> Result<(), TransportError>;

    /// Name of the binding, for logs.
    fn name(&self) -> &str;
}

// =============================================================================
// TransportFactory
// =============================================================================

/// Produces transport handles.
///
/// `init` is called once before the first `create` and `shutdown` once when
/// the process is done with the binding.
pub trait TransportFactory: Send + Sync {
    /// Prepares the underlying library.
    fn init(&self) -> Result<(), ConnectionError> {
        Ok(())
    }

    /// Creates a fresh, unconnected handle.
    fn create(&self) -> Result<Box<dyn Transport>, ConnectionError>;

    /// Releases the underlying library.
    fn shutdown(&self) {}

    /// Name of the binding, for logs.
    fn name(&self) -> &str;
}

/// Tries a list of factories in order and uses the first that can create a
/// handle.
pub struct FactoryChain {
    factories: Vec<Arc<dyn TransportFactory>>,
}

impl FactoryChain {
    /// Creates a chain. Earlier factories are preferred.
    pub fn new(factories: Vec<Arc<dyn TransportFactory>>) -> Self {
        Self { factories }
    }
}

impl TransportFactory for FactoryChain {
    fn init(&self) -> Result<(), ConnectionError> {
        let mut reasons = Vec::new();
        let mut any = false;
        for factory in &self.factories {
            match factory.init() {
                Ok(()) => any = true,
                Err(e) => {
                    tracing::debug!(binding = factory.name(), error = %e, "Binding init failed");
                    reasons.push(format!("{}: {}", factory.name(), e));
                }
            }
        }
        if any {
            Ok(())
        } else {
            Err(ConnectionError::Unavailable(reasons.join("; ")))
        }
    }

    fn create(&self) -> Result<Box<dyn Transport>, ConnectionError> {
        let mut reasons = Vec::new();
        for factory in &self.factories {
            match factory.create() {
                Ok(transport) => return Ok(transport),
                Err(e) => reasons.push(format!("{}: {}", factory.name(), e)),
            }
        }
        Err(ConnectionError::Unavailable(reasons.join("; ")))
    }

    fn shutdown(&self) {
        for factory in &self.factories {
            factory.shutdown();
        }
    }

    fn name(&self) -> &str {
        "chain"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken(&'static str);

    impl TransportFactory for Broken {
        fn create(&self) -> Result<Box<dyn Transport>, ConnectionError> {
            Err(ConnectionError::Unavailable("not installed".into()))
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_server_state_codes() {
        for code in 1..=6 {
            let state = ServerState::from_code(code).unwrap();
            assert_eq!(state.code(), code);
        }
        assert!(ServerState::from_code(0).is_none());
        assert!(ServerState::Running.is_running());
        assert!(!ServerState::Suspended.is_running());
    }

    #[test]
    fn test_read_result_into_item() {
        let mut raw = ReadResult::good(1.5);
        let item: Item = raw.clone().into();
        assert!(item.is_good());
        assert_eq!(item.value, Value::Float(1.5));

        raw.quality = 100_000;
        let item: Item = raw.into();
        assert_eq!(item.quality, Quality::Bad);
    }

    #[test]
    fn test_chain_reports_every_failure() {
        let chain = FactoryChain::new(vec![Arc::new(Broken("first")), Arc::new(Broken("second"))]);
        let err = chain.create().err().unwrap();
        let msg = err.to_string();
        assert!(msg.contains("first: transport unavailable"));
        assert!(msg.contains("second: transport unavailable"));
        assert!(chain.init().is_ok());
    }
}
