// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use std::path::PathBuf;

use taglink_config::{ConfigFormat, TaglinkConfig};

use crate::cli::{Cli, OutputFormat, ValidateArgs, DEFAULT_CONFIG_FILE};
use crate::error::{BinError, BinResult};

/// Validates the configuration file and prints a summary.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if !config_path.exists() {
        return Err(BinError::settings(format!(
            "file not found: {}",
            config_path.display()
        )));
    }

    let config = taglink_config::load_config(&config_path)?;

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Server: {}", config.connection.server);
            println!("  Nodes: {}", config.connection.nodes.join(", "));
            println!("  Tags: {}", config.connection.tags.len());
            println!("  Polling: {} ms", config.polling.interval_ms);
            println!("  API: {}", config.api.socket_addr());
            println!("  Read-only: {}", config.api.read_only);

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                let rendered = ConfigFormat::Yaml
                    .render(&config)
                    .map_err(|e| BinError::output(e.to_string()))?;
                print!("{}", rendered);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "server": config.connection.server,
                    "nodes": config.connection.nodes,
                    "tag_count": config.connection.tags.len(),
                    "poll_interval_ms": config.polling.interval_ms,
                    "api_address": config.api.socket_addr().to_string(),
                    "read_only": config.api.read_only,
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            let rendered = serde_json::to_string_pretty(&output)?;
            println!("{}", rendered);
        }
    }

    Ok(())
}

/// Non-fatal observations about a valid configuration.
fn collect_warnings(config: &TaglinkConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.connection.tags.is_empty() {
        warnings.push("No initial tags configured".to_string());
    }

    let missing: Vec<&str> = config
        .connection
        .nodes
        .iter()
        .filter(|n| !config.simulator.nodes.contains(n))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        warnings.push(format!(
            "Simulator does not answer on: {}",
            missing.join(", ")
        ));
    }

    warnings
}
