// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `serve` command.

use std::net::SocketAddr;
use std::sync::Arc;

use taglink_api::{ApiServer, AppState};
use taglink_core::TagConnection;
use tracing::info;

use crate::cli::ServeArgs;
use crate::error::{BinError, BinResult};
use crate::runtime::TagRuntime;

/// Serves the REST API until shutdown.
pub async fn serve(runtime: &TagRuntime, args: ServeArgs) -> BinResult<()> {
    let api = &runtime.config().api;
    let addr = SocketAddr::new(
        args.bind.unwrap_or(api.bind_address),
        args.port.unwrap_or(api.port),
    );
    let read_only = args.read_only || api.read_only;

    let conn = runtime.connect(&[]).await?;
    info!(
        server = %conn.server(),
        addr = %addr,
        read_only,
        "API starting"
    );

    let shared: Arc<dyn TagConnection> = conn.clone();
    let state = AppState::new(shared).with_read_only(read_only);
    let result = ApiServer::new(state)
        .with_addr(addr)
        .run_with_shutdown(runtime.shutdown().shutdown_signal())
        .await;

    conn.close().await;
    result.map_err(BinError::from)
}
