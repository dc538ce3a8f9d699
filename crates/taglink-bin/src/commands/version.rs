// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::error::BinResult;

/// Prints version information.
pub fn version() -> BinResult<()> {
    println!("taglink - tag client for industrial automation servers");
    println!();
    println!("Version Information:");
    println!("  taglink-bin:    {}", crate::VERSION);
    println!("  taglink-api:    {}", taglink_api::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:         {}", std::env::consts::ARCH);
    println!("  OS:             {}", std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
