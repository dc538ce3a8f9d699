// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Physical session management.
//!
//! A [`Session`] owns at most one transport handle. Connecting walks the
//! candidate nodes in order and keeps the first that answers; on success the
//! caller receives a fresh [`TagRegistry`] bound to the new session.

use std::sync::Arc;

use crate::error::{ConnectionError, NodeFailure, TagResult};
use crate::registry::TagRegistry;
use crate::transport::{ServerState, Transport, TransportFactory};

/// One physical connection to a tag server.
pub struct Session {
    factory: Arc<dyn TransportFactory>,
    transport: Option<Box<dyn Transport>>,
    node: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("binding", &self.factory.name())
            .field("node", &self.node)
            .field("has_handle", &self.transport.is_some())
            .finish()
    }
}

impl Session {
    /// Creates an empty session. No handle exists until the first connect.
    pub fn new(factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            factory,
            transport: None,
            node: None,
        }
    }

    /// Returns the node of the current connection.
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    /// Returns the live transport handle, if any.
    pub fn transport(&self) -> Option<&dyn Transport> {
        self.transport.as_deref()
    }

    /// Tries each node in order and returns the registry of the first
    /// successful connection.
    ///
    /// When every node fails, the error lists each node's reason.
    pub async fn try_connect(&mut self, server: &str, nodes: &[String]) -> TagResult<TagRegistry> {
        if nodes.is_empty() {
            return Err(ConnectionError::NoNodes {
                server: server.to_string(),
            }
            .into());
        }

        let mut failures = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.connect(server, node).await {
                Ok(registry) => return Ok(registry),
                Err(e) => {
                    tracing::debug!(server = %server, node = %node, error = %e, "Connect attempt failed");
                    failures.push(NodeFailure {
                        node: node.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(ConnectionError::AllNodesFailed {
            server: server.to_string(),
            failures,
        }
        .into())
    }

    /// Connects to `server` on one node, dropping any current session first.
    pub async fn connect(&mut self, server: &str, node: &str) -> Result<TagRegistry, ConnectionError> {
        if self.is_connected().await {
            self.disconnect().await;
        }

        if self.transport.is_none() {
            self.transport = Some(self.factory.create()?);
        }
        let Some(transport) = self.transport.as_mut() else {
            return Err(ConnectionError::NotConnected);
        };

        let failed = |source| ConnectionError::Failed {
            server: server.to_string(),
            node: node.to_string(),
            source,
        };

        transport.connect(server, node).await.map_err(failed)?;
        let group = transport.create_group().await.map_err(failed)?;

        tracing::info!(server = %server, node = %node, binding = transport.name(), "Connected");
        self.node = Some(node.to_string());
        Ok(TagRegistry::new(group))
    }

    /// Queries the live server state.
    ///
    /// A session without a handle, or whose handle reports an error, is not
    /// connected. Only [`ServerState::Running`] counts as connected.
    pub async fn is_connected(&self) -> bool {
        let Some(transport) = self.transport.as_ref() else {
            return false;
        };
        match transport.server_state().await {
            Ok(state) => state == ServerState::Running,
            Err(e) => {
                tracing::trace!(error = %e, "Server state query failed");
                false
            }
        }
    }

    /// Drops the current session but keeps the handle for reuse.
    pub async fn disconnect(&mut self) {
        if let Some(transport) = self.transport.as_mut() {
            if let Err(e) = transport.disconnect().await {
                tracing::debug!(error = %e, "Disconnect failed");
            }
        }
        self.node = None;
    }

    /// Disconnects and releases the handle.
    pub async fn close(&mut self) {
        self.disconnect().await;
        self.transport = None;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TagError;
    use crate::simulator::{Simulator, DEFAULT_SERVER};

    fn nodes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_session_is_not_connected() {
        let session = Session::new(Arc::new(Simulator::new()));
        assert!(!session.is_connected().await);
        assert!(session.transport().is_none());
    }

    #[tokio::test]
    async fn test_first_reachable_node_wins() {
        let sim = Simulator::new().with_nodes(["beta", "gamma"]);
        let mut session = Session::new(Arc::new(sim.clone()));

        session
            .try_connect(DEFAULT_SERVER, &nodes(&["alpha", "beta", "gamma"]))
            .await
            .unwrap();

        assert_eq!(session.node(), Some("beta"));
        assert!(session.is_connected().await);
        assert_eq!(sim.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_all_nodes_failed() {
        let sim = Simulator::new().with_nodes(Vec::<String>::new());
        let mut session = Session::new(Arc::new(sim));

        let err = session
            .try_connect(DEFAULT_SERVER, &nodes(&["alpha", "beta"]))
            .await
            .unwrap_err();

        match err {
            TagError::Connection(ConnectionError::AllNodesFailed { failures, .. }) => {
                let attempted: Vec<_> = failures.iter().map(|f| f.node.as_str()).collect();
                assert_eq!(attempted, vec!["alpha", "beta"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn test_no_nodes() {
        let mut session = Session::new(Arc::new(Simulator::new()));
        let err = session.try_connect(DEFAULT_SERVER, &[]).await.unwrap_err();
        assert!(matches!(
            err,
            TagError::Connection(ConnectionError::NoNodes { .. })
        ));
    }

    #[tokio::test]
    async fn test_reconnect_drops_previous_session() {
        let sim = Simulator::new();
        let mut session = Session::new(Arc::new(sim.clone()));

        session.connect(DEFAULT_SERVER, "localhost").await.unwrap();
        session.connect(DEFAULT_SERVER, "localhost").await.unwrap();
        assert_eq!(sim.connect_count(), 2);
        assert!(session.is_connected().await);

        session.close().await;
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn test_outage_detected() {
        let sim = Simulator::new();
        let mut session = Session::new(Arc::new(sim.clone()));
        session.connect(DEFAULT_SERVER, "localhost").await.unwrap();

        sim.go_down();
        assert!(!session.is_connected().await);
    }
}
