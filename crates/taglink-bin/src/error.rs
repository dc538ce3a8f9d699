// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the taglink binary.
//!
//! Every error maps to a process exit code:
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 1    | configuration missing or invalid          |
//! | 2    | transport binding unavailable             |
//! | 3    | server unreachable or tag operation failed|
//! | 4    | API server failed                         |
//! | 5    | output could not be written               |
//! | 70   | anything else                             |

use taglink_core::TagError;
use thiserror::Error;

/// Result type alias for taglink-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Process exit codes.
pub mod exit {
    /// Configuration missing or invalid.
    pub const CONFIG: i32 = 1;
    /// Transport binding unavailable.
    pub const TRANSPORT: i32 = 2;
    /// Server unreachable or a tag operation failed.
    pub const TAG: i32 = 3;
    /// API server failed.
    pub const API: i32 = 4;
    /// Output could not be written.
    pub const OUTPUT: i32 = 5;
    /// Internal software error (sysexits `EX_SOFTWARE`).
    pub const SOFTWARE: i32 = 70;
}

/// Failures of a taglink command.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration file failed to load.
    #[error("invalid configuration: {0}")]
    Config(#[from] taglink_config::ConfigError),

    /// The configuration is unusable for the command.
    #[error("configuration: {0}")]
    Settings(String),

    /// The transport factory could not be initialised.
    #[error("transport '{binding}' unavailable: {message}")]
    Transport {
        /// Factory name.
        binding: String,
        /// Reason reported by the factory.
        message: String,
    },

    /// Connecting or a tag operation failed.
    #[error(transparent)]
    Tag(#[from] TagError),

    /// The REST server failed.
    #[error("API server: {0}")]
    Api(#[from] taglink_api::ApiError),

    /// Results could not be encoded or written.
    #[error("output: {0}")]
    Output(String),

    /// Any other failure.
    #[error("{0}")]
    Runtime(String),

    /// An error with a description of what was being attempted.
    #[error("{context}: {source}")]
    Context {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Unusable configuration.
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    /// Transport factory failure.
    pub fn transport(binding: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            binding: binding.into(),
            message: message.into(),
        }
    }

    /// Output failure.
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }

    /// Other failure.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Wraps this error with what was being attempted.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Settings(_) => exit::CONFIG,
            Self::Transport { .. } => exit::TRANSPORT,
            Self::Tag(_) => exit::TAG,
            Self::Api(_) => exit::API,
            Self::Output(_) => exit::OUTPUT,
            Self::Runtime(_) => exit::SOFTWARE,
            Self::Context { source, .. } => source.exit_code(),
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<serde_json::Error> for BinError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(format!("encoding JSON: {}", err))
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Runtime(format!("{:#}", err))
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints `error` and its causes to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("taglink: {}", error);

    let mut cause = std::error::Error::source(error);
    while let Some(inner) = cause {
        eprintln!("  because: {}", inner);
        cause = inner.source();
    }
}

/// Prints `error` and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================
