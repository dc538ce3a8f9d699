// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.

mod info;
mod observe;
mod read;
mod serve;
mod validate;
mod version;
mod watch;

pub use info::info;
pub use observe::observe;
pub use read::read;
pub use serve::serve;
pub use validate::validate;
pub use version::version;
pub use watch::watch;

use std::collections::{BTreeMap, HashMap};

use taglink_core::{Item, Value};

use crate::cli::{Cli, Commands, OutputFormat};
use crate::error::{BinError, BinResult};
use crate::logging::init_logging;
use crate::runtime::{load_settings, TagRuntime};
use crate::shutdown::ShutdownCoordinator;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Version => version::version(),
        Commands::Validate(args) => {
            init_logging(
                cli.effective_log_level("warn"),
                cli.log_format.unwrap_or_default(),
            );
            validate::validate(&cli, args)
        }
        command => run_connected(&cli, command).await,
    }
}

/// Runs a command that talks to the server.
async fn run_connected(cli: &Cli, command: Commands) -> BinResult<()> {
    let config = load_settings(cli)?;
    init_logging(
        cli.effective_log_level(config.logging.level.as_str()),
        cli.log_format.unwrap_or(config.logging.format.into()),
    );

    let shutdown = ShutdownCoordinator::new();
    shutdown.listen_for_signals();
    let runtime = TagRuntime::new(config, shutdown)?;

    let result = match command {
        Commands::Serve(args) => serve::serve(&runtime, args).await,
        Commands::Read(args) => read::read(&runtime, args).await,
        Commands::Watch(args) => watch::watch(&runtime, args).await,
        Commands::Observe(args) => observe::observe(&runtime, args).await,
        Commands::Info => info::info(&runtime).await,
        Commands::Version | Commands::Validate(_) => {
            Err(BinError::runtime("command does not use a connection"))
        }
    };

    runtime.close();
    result
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Renders read results, sorted by tag.
pub fn render_items(items: &HashMap<String, Item>, format: OutputFormat) -> BinResult<String> {
    let sorted: BTreeMap<_, _> = items.iter().collect();
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&sorted)?),
        OutputFormat::Text => {
            let width = sorted.keys().map(|t| t.len()).max().unwrap_or(0);
            Ok(sorted
                .iter()
                .map(|(tag, item)| format!("{:width$}  {}", tag, item, width = width))
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}

/// Renders cached values, sorted by tag.
pub fn render_values(values: &HashMap<String, Value>, format: OutputFormat) -> BinResult<String> {
    let sorted: BTreeMap<_, _> = values.iter().collect();
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(&sorted)?),
        OutputFormat::Text => Ok(sorted
            .iter()
            .map(|(tag, value)| format!("{}={}", tag, value))
            .collect::<Vec<_>>()
            .join(" ")),
    }
}

// =============================================================================
// Tests
// =============================================================================
