// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Config Integration Tests
//!
//! - `test_load_*`: files in every supported format
//! - `test_env_*`: placeholders and environment overrides
//! - `test_validation_*`: rejected configurations
//! - `test_config_drives_*`: loaded settings applied to a live connection

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use taglink_config::{
    load_config, ConfigError, ConfigFormat, ConfigLoader, LogFormat, LogLevel,
};
use taglink_core::{Connection, Simulator, TagConnection};
use taglink_tests::common::init_test_logging;
use tempfile::NamedTempFile;

// =============================================================================
// Test Helpers
// =============================================================================

fn write_config(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("taglink-")
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const FULL_YAML: &str = r#"
connection:
  server: Graybox.Simulator
  nodes: [plant-a, plant-b]
  tags:
    - numeric.sin.float
    - storage.numeric.reg01
  heal_delay_ms: 25
polling:
  interval_ms: 250
api:
  bind_address: 127.0.0.1
  port: 8081
  read_only: true
logging:
  level: debug
  format: json
simulator:
  nodes: [plant-b]
"#;

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_yaml() {
    init_test_logging();
    let file = write_config(".yaml", FULL_YAML);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.connection.server, "Graybox.Simulator");
    assert_eq!(config.connection.nodes, vec!["plant-a", "plant-b"]);
    assert_eq!(config.connection.tags.len(), 2);
    assert_eq!(config.connection.heal_delay(), Duration::from_millis(25));
    assert_eq!(config.polling.interval(), Duration::from_millis(250));
    assert_eq!(config.api.socket_addr().to_string(), "127.0.0.1:8081");
    assert!(config.api.read_only);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.simulator.nodes, vec!["plant-b"]);
}

#[test]
fn test_load_toml() {
    init_test_logging();
    let file = write_config(
        ".toml",
        r#"
[connection]
server = "Vendor.Server.1"
nodes = ["10.0.0.5"]
tags = ["a.b"]

[polling]
interval_ms = 50
"#,
    );
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.connection.server, "Vendor.Server.1");
    assert_eq!(config.connection.nodes, vec!["10.0.0.5"]);
    assert_eq!(config.polling.interval_ms, 50);
    assert_eq!(config.api.port, 4000);
}

#[test]
fn test_load_json() {
    init_test_logging();
    let file = write_config(".json", r#"{"api": {"port": 9000}, "logging": {"level": "warning"}}"#);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.api.port, 9000);
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.polling.interval_ms, 1000);
}

#[test]
fn test_load_unknown_extension() {
    let file = write_config(".ini", "[connection]\n");
    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_load_missing_file() {
    let result = load_config("/definitely/not/here/taglink.yaml");
    assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
}

#[test]
fn test_load_malformed_file_names_path() {
    let file = write_config(".json", "{ not json");
    match load_config(file.path()) {
        Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
        other => panic!("Expected parse error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_load_unknown_key_rejected() {
    let file = write_config(".json", r#"{"conection": {"server": "typo"}}"#);
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_load_rendered_config_round_trip() {
    let file = write_config(".yaml", FULL_YAML);
    let config = load_config(file.path()).unwrap();

    let rendered = ConfigFormat::Toml.render(&config).unwrap();
    let copy = write_config(".toml", &rendered);
    let reloaded = load_config(copy.path()).unwrap();

    assert_eq!(reloaded.connection.nodes, config.connection.nodes);
    assert_eq!(reloaded.api.port, config.api.port);
    assert_eq!(reloaded.logging.format, config.logging.format);
}

// =============================================================================
// Environment
// =============================================================================

#[test]
fn test_env_placeholder_default() {
    let file = write_config(
        ".yaml",
        "connection:\n  server: ${TLINT_UNSET_SERVER:Vendor.OPC.1}\n",
    );
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.connection.server, "Vendor.OPC.1");
}

#[test]
fn test_env_placeholder_set() {
    std::env::set_var("TLINT_SET_NODE", "cell-7");
    let file = write_config(".yaml", "connection:\n  nodes: [\"${TLINT_SET_NODE}\"]\n");
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.connection.nodes, vec!["cell-7"]);
}

#[test]
fn test_env_prefixed_overrides() {
    std::env::set_var("TLINTOV_API_PORT", "5123");
    std::env::set_var("TLINTOV_POLL_INTERVAL_MS", "75");
    std::env::set_var("TLINTOV_LOG_LEVEL", "error");

    let config = ConfigLoader::new()
        .with_env_prefix("TLINTOV")
        .load_from_str("{}", ConfigFormat::Json)
        .unwrap();

    assert_eq!(config.api.port, 5123);
    assert_eq!(config.polling.interval_ms, 75);
    assert_eq!(config.logging.level, LogLevel::Error);
}

#[test]
fn test_env_overrides_disabled() {
    std::env::set_var("TLINTOFF_API_PORT", "5124");
    let config = ConfigLoader::new()
        .with_env_prefix("TLINTOFF")
        .with_env_vars(false)
        .load_from_str("{}", ConfigFormat::Json)
        .unwrap();
    assert_eq!(config.api.port, 4000);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_validation_interval_bounds() {
    let loader = ConfigLoader::new().with_env_vars(false);
    let err = loader
        .load_from_str(r#"{"polling": {"interval_ms": 0}}"#, ConfigFormat::Json)
        .unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { .. }));
}

#[test]
fn test_validation_empty_nodes() {
    let loader = ConfigLoader::new().with_env_vars(false);
    let err = loader
        .load_from_str(r#"{"connection": {"nodes": []}}"#, ConfigFormat::Json)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Validation { .. }));
}

#[test]
fn test_validation_blank_tag() {
    let loader = ConfigLoader::new().with_env_vars(false);
    let err = loader
        .load_from_str(r#"{"connection": {"tags": ["ok", "  "]}}"#, ConfigFormat::Json)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Validation { .. }));
}

// =============================================================================
// Config Drives Connection
// =============================================================================

#[tokio::test]
async fn test_config_drives_connection() {
    init_test_logging();
    let file = write_config(".yaml", FULL_YAML);
    let config = load_config(file.path()).unwrap();

    let sim = Simulator::new()
        .with_server(config.connection.server.clone())
        .with_nodes(config.simulator.nodes.clone());
    let conn = Connection::builder()
        .server(config.connection.server.clone())
        .nodes(config.connection.nodes.clone())
        .tags(config.connection.tags.clone())
        .heal_delay(config.connection.heal_delay())
        .metrics(false)
        .connect(Arc::new(sim))
        .await
        .unwrap();

    assert_eq!(conn.node().await.as_deref(), Some("plant-b"));
    assert_eq!(conn.read().await.len(), 2);
    conn.close().await;
}
