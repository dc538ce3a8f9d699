// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taglink-bin
//!
//! Command line client and API server for taglink.
//!
//! ## Usage
//!
//! ```bash
//! # Serve the REST API (default command)
//! taglink
//!
//! # Read two tags once, as JSON
//! taglink read numeric.sin.float boolean.toggle -f json
//!
//! # Print every refresh of a polling cache
//! taglink watch numeric.saw.float -i 250
//!
//! # Wake up whenever a register reaches 1.0
//! taglink observe storage.numeric.reg01 --value 1.0
//!
//! # Try a primary and a backup node
//! taglink info -s Graybox.Simulator -n primary -n backup
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{load_settings, TagRuntime};
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
