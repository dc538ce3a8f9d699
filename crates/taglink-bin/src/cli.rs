// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `serve`: run the REST API (default)
//! - `read`: read tags once
//! - `watch`: print a polling cache on every refresh
//! - `observe`: print a line whenever a tag changes or hits a value
//! - `info`: check whether the server is running
//! - `validate`: validate a configuration file
//! - `version`: show version information

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Default configuration file, used when present and no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "taglink.yaml";

// =============================================================================
// Main CLI Structure
// =============================================================================

/// taglink - tag client for industrial automation servers
#[derive(Parser, Debug)]
#[command(
    name = "taglink",
    version = crate::VERSION,
    about = "Read, write and watch tags on an automation server",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TAGLINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "TAGLINK_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Server program id; overrides the config file
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Node to try, in order; repeat for fallbacks
    #[arg(short, long = "node", global = true)]
    pub nodes: Vec<String>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the REST API
    ///
    /// This is the default command when no subcommand is specified.
    Serve(ServeArgs),

    /// Read tags once and print them
    Read(ReadArgs),

    /// Keep a polling cache and print it on every refresh
    Watch(WatchArgs),

    /// Print a line whenever a tag changes, or equals a value
    Observe(ObserveArgs),

    /// Check whether the server is up and running
    Info,

    /// Validate the configuration file
    Validate(ValidateArgs),

    /// Show version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `serve` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short, long)]
    pub bind: Option<IpAddr>,

    /// Reject writes
    #[arg(long)]
    pub read_only: bool,
}

/// Arguments for the `read` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ReadArgs {
    /// Tags to read; defaults to the configured tags
    pub tags: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `watch` command.
#[derive(Args, Debug, Default, Clone)]
pub struct WatchArgs {
    /// Tags to watch; defaults to the configured tags
    pub tags: Vec<String>,

    /// Refresh interval in milliseconds; defaults to the configured interval
    #[arg(short, long)]
    pub interval_ms: Option<u64>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `observe` command.
#[derive(Args, Debug, Clone)]
pub struct ObserveArgs {
    /// Tag to observe
    pub tag: String,

    /// Notify only when the tag equals this value (JSON scalar or text)
    #[arg(long)]
    pub value: Option<String>,

    /// Polling interval in milliseconds; defaults to the configured interval
    #[arg(short, long)]
    pub interval_ms: Option<u64>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<taglink_config::LogFormat> for LogFormat {
    fn from(format: taglink_config::LogFormat) -> Self {
        match format {
            taglink_config::LogFormat::Text => LogFormat::Text,
            taglink_config::LogFormat::Json => LogFormat::Json,
            taglink_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Serve` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Serve(ServeArgs::default()))
    }

    /// Get the effective log level, given the configured one.
    pub fn effective_log_level<'a>(&'a self, configured: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else {
            self.log_level.as_deref().unwrap_or(configured)
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
    fn test_default_command() {
        let cli = Cli::parse_from(["taglink"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Serve(_)));
    }

    #[test]
    fn test_read_command() {
        let cli = Cli::parse_from(["taglink", "read", "a.b", "c.d", "-f", "json"]);
        if let Some(Commands::Read(args)) = cli.command {
            assert_eq!(args.tags, vec!["a.b", "c.d"]);
            assert_eq!(args.format, OutputFormat::Json);
        } else {
            panic!("Expected Read command");
        }
    }

    #[test]
    fn test_observe_command() {
        let cli = Cli::parse_from([
            "taglink",
            "observe",
            "numeric.saw.float",
            "--value",
            "1.5",
            "-i",
            "100",
        ]);
        if let Some(Commands::Observe(args)) = cli.command {
            assert_eq!(args.tag, "numeric.saw.float");
            assert_eq!(args.value.as_deref(), Some("1.5"));
            assert_eq!(args.interval_ms, Some(100));
        } else {
            panic!("Expected Observe command");
        }
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::parse_from(["taglink", "serve", "-p", "8765", "--read-only"]);
        if let Some(Commands::Serve(args)) = cli.command {
            assert_eq!(args.port, Some(8765));
            assert!(args.read_only);
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::parse_from([
            "taglink", "info", "-s", "Vendor.Server", "-n", "primary", "-n", "backup",
        ]);
        assert_eq!(cli.server.as_deref(), Some("Vendor.Server"));
        assert_eq!(cli.nodes, vec!["primary", "backup"]);
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::parse_from(["taglink", "-l", "debug"]);
        assert_eq!(cli.effective_log_level("info"), "debug");

        let cli = Cli::parse_from(["taglink"]);
        assert_eq!(cli.effective_log_level("error"), "error");

        let cli = Cli::parse_from(["taglink", "-q", "-l", "trace"]);
        assert_eq!(cli.effective_log_level("info"), "warn");
    }
}
