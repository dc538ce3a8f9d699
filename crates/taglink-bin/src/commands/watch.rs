// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `watch` command.

use std::sync::Arc;
use std::time::Duration;

use taglink_core::{PollingCache, TagConnection};
use tracing::info;

use super::render_values;
use crate::cli::WatchArgs;
use crate::error::BinResult;
use crate::runtime::TagRuntime;

/// Prints the polling cache after every refresh until shutdown.
pub async fn watch(runtime: &TagRuntime, args: WatchArgs) -> BinResult<()> {
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| runtime.config().polling.interval());

    let conn = runtime.connect(&args.tags).await?;
    let shared: Arc<dyn TagConnection> = conn.clone();
    let cache = PollingCache::sync(shared, interval).await;
    info!(interval_ms = interval.as_millis() as u64, tags = cache.len(), "Watching");

    let mut ticker = tokio::time::interval(interval);
    let shutdown = runtime.shutdown().shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let line = render_values(&cache.snapshot(), args.format)?;
                println!("{} {}", chrono::Local::now().format("%H:%M:%S%.3f"), line);
            }
        }
    }

    cache.close().await;
    conn.close().await;
    Ok(())
}
