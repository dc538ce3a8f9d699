// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for tag connections.
//!
//! ```text
//! TagError
//! ├── Connection  - Endpoint and session failures
//! ├── Subscribe   - Per-tag subscription failures, aggregated
//! ├── Operation   - Read/write failures and unknown tags
//! └── Transport   - Errors raised by the underlying binding
//! ```
//!
//! Steady-state read failures are absorbed by the connection's self-heal and
//! never reach the caller. Everything in this module is what remains visible.

use std::fmt;
use thiserror::Error;
use tracing::Level;

/// Result alias for tag operations.
pub type TagResult<T> = Result<T, TagError>;

// =============================================================================
// TagError
// =============================================================================

/// The main error type for tag operations.
#[derive(Debug, Error)]
pub enum TagError {
    /// Connection-related errors.
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// Tag subscription errors.
    #[error("{0}")]
    Subscribe(#[from] SubscribeError),

    /// Read/write operation errors.
    #[error("{0}")]
    Operation(#[from] OperationError),

    /// Errors reported by the transport binding.
    #[error("{0}")]
    Transport(#[from] TransportError),
}

impl TagError {
    /// Creates a "tag not found" error.
    pub fn not_found(tag: impl Into<String>) -> Self {
        Self::Operation(OperationError::NotFound { tag: tag.into() })
    }

    /// Creates a not connected error.
    pub fn not_connected() -> Self {
        Self::Connection(ConnectionError::NotConnected)
    }

    /// Returns `true` if the error says the tag is not subscribed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Operation(OperationError::NotFound { .. }))
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(e) => e.is_retryable(),
            Self::Subscribe(_) => false,
            Self::Operation(e) => e.is_retryable(),
            Self::Transport(e) => e.is_retryable(),
        }
    }

    /// Returns the error category for logging and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Subscribe(_) => "subscribe",
            Self::Operation(_) => "operation",
            Self::Transport(_) => "transport",
        }
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        match self {
            Self::Connection(_) => Level::ERROR,
            Self::Operation(OperationError::NotFound { .. }) => Level::DEBUG,
            _ => Level::WARN,
        }
    }

    /// Logs this error with appropriate level and context.
    pub fn log(&self, context: &str) {
        match self.tracing_level() {
            Level::ERROR => tracing::error!(
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            _ => tracing::debug!(
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
        }
    }
}

// =============================================================================
// ConnectionError
// =============================================================================

/// Connection-related errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// A single connect attempt failed.
    #[error("cannot connect to '{server}' on node '{node}': {source}")]
    Failed {
        /// Server program id.
        server: String,
        /// Node the attempt targeted.
        node: String,
        /// Reason reported by the transport.
        #[source]
        source: TransportError,
    },

    /// Every candidate node failed.
    #[error("cannot connect to '{server}': {}", NodeFailures(.failures))]
    AllNodesFailed {
        /// Server program id.
        server: String,
        /// One entry per attempted node, in attempt order.
        failures: Vec<NodeFailure>,
    },

    /// No candidate nodes were given.
    #[error("no nodes configured for server '{server}'")]
    NoNodes {
        /// Server program id.
        server: String,
    },

    /// The session has no live transport handle.
    #[error("not connected to tag server")]
    NotConnected,

    /// The transport library could not be loaded.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

impl ConnectionError {
    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NoNodes { .. } | Self::Unavailable(_))
    }
}

/// Failure of one node during a multi-node connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    /// The node that was attempted.
    pub node: String,
    /// Reason the attempt failed.
    pub reason: String,
}

struct NodeFailures<'a>(&'a [NodeFailure]);

impl fmt::Display for NodeFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", failure.node, failure.reason)?;
        }
        Ok(())
    }
}

// =============================================================================
// SubscribeError
// =============================================================================

/// Aggregated per-tag subscription failures from one `add` call.
#[derive(Debug, Error)]
#[error("cannot add tags: {}", TagFailures(.failures))]
pub struct SubscribeError {
    /// Failed tags and their reasons, in request order.
    pub failures: Vec<(String, String)>,
}

impl SubscribeError {
    /// Returns the names of the tags that failed.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|(tag, _)| tag.as_str())
    }
}

struct TagFailures<'a>(&'a [(String, String)]);

impl fmt::Display for TagFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (tag, reason)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", tag, reason)?;
        }
        Ok(())
    }
}

// =============================================================================
// OperationError
// =============================================================================

/// Read and write errors.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The tag is not subscribed; nothing was sent to the server.
    #[error("tag '{tag}' not found, no write performed")]
    NotFound {
        /// The requested tag.
        tag: String,
    },

    /// The server rejected or failed a write.
    #[error("write to '{tag}' failed: {source}")]
    WriteFailed {
        /// The target tag.
        tag: String,
        /// Reason reported by the transport.
        #[source]
        source: TransportError,
    },

    /// The server failed a read.
    #[error("read of '{tag}' failed: {source}")]
    ReadFailed {
        /// The target tag.
        tag: String,
        /// Reason reported by the transport.
        #[source]
        source: TransportError,
    },
}

impl OperationError {
    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotFound { .. } => false,
            Self::WriteFailed { source, .. } | Self::ReadFailed { source, .. } => {
                source.is_retryable()
            }
        }
    }
}

// =============================================================================
// TransportError
// =============================================================================

/// Errors raised by a [`Transport`](crate::transport::Transport) binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The node could not be reached.
    #[error("node '{0}' unreachable")]
    Unreachable(String),

    /// The server program is not registered on the node.
    #[error("server '{0}' not found")]
    UnknownServer(String),

    /// The session was severed.
    #[error("session lost")]
    SessionLost,

    /// The server does not know the tag.
    #[error("unknown item '{0}'")]
    UnknownItem(String),

    /// The item handle is not valid for this session.
    #[error("invalid handle {0}")]
    InvalidHandle(u32),

    /// The tag is read-only.
    #[error("access denied (code {code})", code = TransportError::BAD_RIGHTS)]
    BadRights,

    /// The value type does not match the tag.
    #[error("type mismatch (code {code})", code = TransportError::BAD_TYPE)]
    BadType,

    /// Any other failure reported by the binding.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Server result code for an access-rights violation.
    pub const BAD_RIGHTS: i32 = -1073479674;

    /// Server result code for a type mismatch.
    pub const BAD_TYPE: i32 = -1073479676;

    /// Returns `true` if the failure may go away on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::SessionLost | Self::Other(_))
    }
}

// =============================================================================
// Tests
// =============================================================================
