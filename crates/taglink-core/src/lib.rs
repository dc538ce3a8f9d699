// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core of the taglink tag client.
//!
//! This crate keeps a live connection to a tag server, tracks a dynamic set of
//! subscribed tags, and serves reads and writes against them while surviving
//! transient connection loss.
//!
//! # Architecture
//!
//! ```text
//! PollingCache ──┐                   ┌── Session ──── Transport ──► server
//!                ├──► Connection ────┤
//! Observer ──────┘   (one mutex)     └── TagRegistry
//! ```
//!
//! - [`Connection`]: add/remove/read/write with transparent self-heal
//! - [`PollingCache`]: background full reads, concurrent point lookups
//! - [`Observer`]: per-tag triggers fanned out to capacity-1 channels
//! - [`Transport`]: the binding to the remote server, created by a
//!   [`TransportFactory`]; [`Simulator`] is an in-process implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use taglink_core::{Connection, PollingCache, Simulator, TagConnection};
//!
//! let conn: Arc<dyn TagConnection> = Arc::new(
//!     Connection::builder()
//!         .tags(["numeric.sin.float", "numeric.saw.float"])
//!         .connect(Arc::new(Simulator::new()))
//!         .await?,
//! );
//!
//! let cache = PollingCache::sync(conn.clone(), Duration::from_millis(500)).await;
//! println!("{:?}", cache.get("numeric.sin.float"));
//! cache.close().await;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod cache;
pub mod connection;
pub mod control;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod registry;
pub mod session;
pub mod simulator;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use cache::PollingCache;
pub use connection::{Connection, ConnectionBuilder, ConnectionStats, TagConnection};
pub use control::Closer;
pub use error::{
    ConnectionError, NodeFailure, OperationError, SubscribeError, TagError, TagResult,
    TransportError,
};
pub use metrics::TagMetricsCollector;
pub use observer::{Observer, OnChange, OnValue, Trigger};
pub use registry::TagRegistry;
pub use session::Session;
pub use simulator::Simulator;
pub use transport::{
    DataSource, FactoryChain, GroupHandle, ItemHandle, ReadResult, ServerState, Transport,
    TransportFactory,
};
pub use types::{Item, Quality, Value};
