// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taglink-config
//!
//! Configuration schema and loading for taglink.
//!
//! ## Features
//!
//! - **Multi-Format Support**: YAML, TOML and JSON, chosen by file extension
//! - **Placeholders**: `${VAR}` and `${VAR:default}` resolved before parsing
//! - **Environment Overrides**: `TAGLINK_API_PORT`, `TAGLINK_LOG_LEVEL`, ...
//! - **Validation**: every section is checked after loading
//!
//! ## Quick Start
//!
//! ```no_run
//! use taglink_config::load_config;
//!
//! let config = load_config("taglink.yaml").unwrap();
//! println!("Server: {}", config.connection.server);
//! println!("Nodes: {:?}", config.connection.nodes);
//! ```
//!
//! ## Configuration Schema
//!
//! - `connection` - server, node list, initial tags, reconnect pause
//! - `polling` - cache and observer interval
//! - `api` - REST API bind address, port and read-only switch
//! - `logging` - level and format
//! - `simulator` - nodes the in-process simulator answers on

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, ConfigFormat, ConfigLoader, ConfigLoaderBuilder};
pub use schema::{
    ApiConfig, ConnectionConfig, LogFormat, LogLevel, LoggingConfig, PollingConfig,
    SimulatorConfig, TaglinkConfig,
};
