// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `observe` command.

use std::sync::Arc;
use std::time::Duration;

use taglink_core::{Observer, OnChange, OnValue, TagConnection, Value};
use tracing::info;

use crate::cli::ObserveArgs;
use crate::error::BinResult;
use crate::runtime::TagRuntime;

/// Prints the tag each time the trigger fires, until shutdown.
pub async fn observe(runtime: &TagRuntime, args: ObserveArgs) -> BinResult<()> {
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| runtime.config().polling.interval());

    let conn = runtime.connect(std::slice::from_ref(&args.tag)).await?;
    let shared: Arc<dyn TagConnection> = conn.clone();

    let observer = match args.value.as_deref() {
        Some(raw) => {
            let target = parse_target(raw);
            info!(tag = %args.tag, target = %target, "Observing for value");
            Observer::new(OnValue::new(target), shared)
        }
        None => {
            info!(tag = %args.tag, "Observing for changes");
            Observer::new(OnChange::new(), shared)
        }
    };

    let mut signals = observer.channel();
    let _closer = observer.observe(args.tag.clone(), interval);

    let shutdown = runtime.shutdown().shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            signal = signals.recv() => {
                if signal.is_none() {
                    break;
                }
                let item = conn.read_item(&args.tag).await;
                println!(
                    "{} {} {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    args.tag,
                    item
                );
            }
        }
    }

    observer.close().await;
    conn.close().await;
    Ok(())
}

/// Parses `--value` as a JSON scalar, falling back to plain text.
fn parse_target(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .as_ref()
        .and_then(Value::from_json)
        .filter(|v| !v.is_null())
        .unwrap_or_else(|| Value::from(raw))
}
