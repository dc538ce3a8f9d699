// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command runtime.
//!
//! Loads configuration, applies command line overrides, prepares the
//! transport factory and opens connections for the commands.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use taglink_config::{load_config, TaglinkConfig};
use taglink_core::{Connection, Simulator, TransportFactory};

use crate::cli::{Cli, DEFAULT_CONFIG_FILE};
use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// Configuration
// =============================================================================

/// Loads the configuration named on the command line.
///
/// Without `--config`, `taglink.yaml` is used when it exists and built-in
/// defaults otherwise. `--server` and `--node` replace the configured values.
pub fn load_settings(cli: &Cli) -> BinResult<TaglinkConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(DEFAULT_CONFIG_FILE)?,
        None => {
            debug!("No configuration file, using defaults");
            TaglinkConfig::default()
        }
    };

    if let Some(server) = &cli.server {
        config.connection.server = server.clone();
    }
    if !cli.nodes.is_empty() {
        config.connection.nodes = cli.nodes.clone();
    }

    config.validate()?;
    Ok(config)
}

// =============================================================================
// TagRuntime
// =============================================================================

/// Shared state of a running command.
pub struct TagRuntime {
    config: Arc<TaglinkConfig>,
    factory: Arc<dyn TransportFactory>,
    shutdown: ShutdownCoordinator,
}

impl TagRuntime {
    /// Prepares the transport for `config`.
    ///
    /// The binary ships the in-process simulator; it answers to the
    /// configured server name on the configured simulator nodes.
    pub fn new(config: TaglinkConfig, shutdown: ShutdownCoordinator) -> BinResult<Self> {
        let simulator = Simulator::new()
            .with_server(config.connection.server.clone())
            .with_nodes(config.simulator.nodes.clone());
        let factory: Arc<dyn TransportFactory> = Arc::new(simulator);

        factory
            .init()
            .map_err(|e| BinError::transport(factory.name(), e.to_string()))?;
        info!(transport = factory.name(), "Transport ready");

        Ok(Self {
            config: Arc::new(config),
            factory,
            shutdown,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TaglinkConfig {
        &self.config
    }

    /// Returns the transport factory.
    pub fn factory(&self) -> Arc<dyn TransportFactory> {
        Arc::clone(&self.factory)
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Opens a connection subscribing `tags`, or the configured tags when
    /// `tags` is empty.
    pub async fn connect(&self, tags: &[String]) -> BinResult<Arc<Connection>> {
        let connection = &self.config.connection;
        let tags = if tags.is_empty() {
            connection.tags.as_slice()
        } else {
            tags
        };

        let conn = Connection::builder()
            .server(connection.server.clone())
            .nodes(connection.nodes.iter().cloned())
            .tags(tags.iter().cloned())
            .heal_delay(connection.heal_delay())
            .connect(self.factory())
            .await
            .map_err(|e| BinError::from(e).context("connecting"))?;

        Ok(Arc::new(conn))
    }

    /// Releases the transport.
    pub fn close(self) {
        self.factory.shutdown();
        debug!("Transport released");
    }
}

// =============================================================================
// Tests
// =============================================================================
