// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `read` command.

use taglink_core::TagConnection;

use super::render_items;
use crate::cli::ReadArgs;
use crate::error::BinResult;
use crate::runtime::TagRuntime;

/// Reads the tags once and prints them.
pub async fn read(runtime: &TagRuntime, args: ReadArgs) -> BinResult<()> {
    let conn = runtime.connect(&args.tags).await?;
    let items = conn.read().await;
    conn.close().await;

    println!("{}", render_items(&items, args.format)?);
    Ok(())
}
