// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `info` command.

use taglink_core::Session;

use crate::error::BinResult;
use crate::runtime::TagRuntime;

/// Connects to the first reachable node and reports the server state.
pub async fn info(runtime: &TagRuntime) -> BinResult<()> {
    let connection = &runtime.config().connection;
    let mut session = Session::new(runtime.factory());

    let mut registry = session
        .try_connect(&connection.server, &connection.nodes)
        .await?;

    let node = session.node().unwrap_or_default().to_string();
    if session.is_connected().await {
        println!("{} on '{}' is up and running.", connection.server, node);
    } else {
        println!("{} on '{}' is not running.", connection.server, node);
    }

    if let Some(transport) = session.transport() {
        registry.close(transport).await;
    }
    session.close().await;
    Ok(())
}
