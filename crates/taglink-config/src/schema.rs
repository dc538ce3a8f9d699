// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema.
//!
//! Every section has defaults, so an empty file is a valid configuration
//! that talks to the local simulator.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default server program id.
pub const DEFAULT_SERVER: &str = "Graybox.Simulator";

/// Default node.
pub const DEFAULT_NODE: &str = "localhost";

/// Default API port.
pub const DEFAULT_API_PORT: u16 = 4000;

/// Default polling interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default pause between reconnect attempts in milliseconds.
pub const DEFAULT_HEAL_DELAY_MS: u64 = 100;

/// Environment variable supplying the default server.
pub const ENV_SERVER: &str = "OPC_SERVER";

/// Environment variable supplying the default nodes, comma separated.
pub const ENV_NODES: &str = "OPC_NODES";

const MIN_POLL_INTERVAL_MS: u64 = 1;
const MAX_POLL_INTERVAL_MS: u64 = 3_600_000;
const MAX_HEAL_DELAY_MS: u64 = 60_000;

// =============================================================================
// Root Configuration
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaglinkConfig {
    /// Server connection settings.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Polling cache and observer settings.
    #[serde(default)]
    pub polling: PollingConfig,

    /// REST API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// In-process simulator settings.
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

impl TaglinkConfig {
    /// Validates every section.
    pub fn validate(&self) -> ConfigResult<()> {
        self.connection.validate()?;
        self.polling.validate()?;
        self.api.validate()?;
        self.logging.validate()?;
        self.simulator.validate()?;
        Ok(())
    }
}

// =============================================================================
// Connection Configuration
// =============================================================================

/// Server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Server program id.
    #[serde(default = "default_server")]
    pub server: String,

    /// Nodes tried in order on every connect.
    #[serde(default = "default_nodes")]
    pub nodes: Vec<String>,

    /// Tags subscribed on startup.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Pause between reconnect attempts.
    #[serde(default = "default_heal_delay_ms")]
    pub heal_delay_ms: u64,
}

fn default_server() -> String {
    env::var(ENV_SERVER)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string())
}

fn default_nodes() -> Vec<String> {
    let nodes = env::var(ENV_NODES)
        .map(|s| split_list(&s))
        .unwrap_or_default();
    if nodes.is_empty() {
        vec![DEFAULT_NODE.to_string()]
    } else {
        nodes
    }
}

fn default_heal_delay_ms() -> u64 {
    DEFAULT_HEAL_DELAY_MS
}

/// Splits a comma separated list, dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl ConnectionConfig {
    /// Pause between reconnect attempts.
    pub fn heal_delay(&self) -> Duration {
        Duration::from_millis(self.heal_delay_ms)
    }

    /// Validates the connection settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.trim().is_empty() {
            return Err(ConfigError::validation("connection.server", "cannot be empty"));
        }
        if self.nodes.is_empty() {
            return Err(ConfigError::validation(
                "connection.nodes",
                "at least one node is required",
            ));
        }
        if self.nodes.iter().any(|n| n.trim().is_empty()) {
            return Err(ConfigError::validation(
                "connection.nodes",
                "node names cannot be empty",
            ));
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::validation(
                "connection.tags",
                "tag names cannot be empty",
            ));
        }
        if self.heal_delay_ms > MAX_HEAL_DELAY_MS {
            return Err(ConfigError::out_of_range(
                "connection.heal_delay_ms",
                self.heal_delay_ms,
                0,
                MAX_HEAL_DELAY_MS,
            ));
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            nodes: default_nodes(),
            tags: Vec::new(),
            heal_delay_ms: DEFAULT_HEAL_DELAY_MS,
        }
    }
}

// =============================================================================
// Polling Configuration
// =============================================================================

/// Polling cache and observer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollingConfig {
    /// Refresh interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl PollingConfig {
    /// Refresh interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Validates the polling settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&self.interval_ms) {
            return Err(ConfigError::out_of_range(
                "polling.interval_ms",
                self.interval_ms,
                MIN_POLL_INTERVAL_MS,
                MAX_POLL_INTERVAL_MS,
            ));
        }
        Ok(())
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

// =============================================================================
// API Configuration
// =============================================================================

/// REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// Listen port.
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Rejects writes when set.
    #[serde(default)]
    pub read_only: bool,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

impl ApiConfig {
    /// Returns the socket address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Validates the API settings.
    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: DEFAULT_API_PORT,
            read_only: false,
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Validates the logging settings.
    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    #[serde(alias = "warning")]
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name, accepting `warning` for `warn`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Single-line compact output.
    Compact,
    /// JSON lines.
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

// =============================================================================
// Simulator Configuration
// =============================================================================

/// In-process simulator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Nodes on which the simulated server is reachable.
    #[serde(default = "default_simulator_nodes")]
    pub nodes: Vec<String>,
}

fn default_simulator_nodes() -> Vec<String> {
    vec![DEFAULT_NODE.to_string()]
}

impl SimulatorConfig {
    /// Validates the simulator settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.nodes.iter().any(|n| n.trim().is_empty()) {
            return Err(ConfigError::validation(
                "simulator.nodes",
                "node names cannot be empty",
            ));
        }
        Ok(())
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            nodes: default_simulator_nodes(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = TaglinkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.port, 4000);
        assert_eq!(config.polling.interval(), Duration::from_secs(1));
        assert_eq!(config.connection.heal_delay(), Duration::from_millis(100));
        assert!(!config.api.read_only);
        assert_eq!(config.simulator.nodes, vec!["localhost"]);
    }

    #[test]
    fn test_empty_server_rejected() {
        let mut config = TaglinkConfig::default();
        config.connection.server = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "connection.server"));
    }

    #[test]
    fn test_empty_nodes_rejected() {
        let mut config = TaglinkConfig::default();
        config.connection.nodes.clear();
        assert!(config.validate().is_err());

        config.connection.nodes = vec!["primary".into(), "".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_interval_bounds() {
        let mut config = TaglinkConfig::default();
        config.polling.interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));

        config.polling.interval_ms = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_tag_rejected() {
        let mut config = TaglinkConfig::default();
        config.connection.tags = vec!["numeric.sin.float".into(), " ".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("loud"), None);
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_socket_addr() {
        let api = ApiConfig {
            port: 8080,
            ..ApiConfig::default()
        };
        assert_eq!(api.socket_addr().to_string(), "0.0.0.0:8080");
    }
}
