// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown.
//!
//! A single `watch` flag flips from `false` to `true` once. Long-running
//! commands (`serve`, `watch`, `observe`) wait on [`ShutdownCoordinator::shutdown_signal`];
//! SIGTERM, SIGINT or Ctrl+C flip the flag.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

/// Shared shutdown flag.
///
/// ```ignore
/// let shutdown = ShutdownCoordinator::new();
/// shutdown.listen_for_signals();
/// server.run_with_shutdown(shutdown.shutdown_signal()).await?;
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
    flag: Arc<watch::Sender<bool>>,
}

impl std::fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("requested", &self.is_shutdown_initiated())
            .finish()
    }
}

impl ShutdownCoordinator {
    /// Creates a coordinator with shutdown not yet requested.
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self { flag: Arc::new(flag) }
    }

    /// Returns a receiver of the flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }

    /// Resolves once shutdown is requested, immediately if it already was.
    pub fn shutdown_signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.flag.subscribe();
        async move {
            // An error means every sender is gone; nothing can request shutdown anymore.
            if rx.wait_for(|requested| *requested).await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Requests shutdown. Only the first call logs.
    pub fn initiate_shutdown(&self) {
        let changed = self.flag.send_if_modified(|requested| {
            let first = !*requested;
            *requested = true;
            first
        });
        if changed {
            info!("Shutdown requested");
        }
    }

    /// Returns `true` once shutdown was requested.
    pub fn is_shutdown_initiated(&self) -> bool {
        *self.flag.borrow()
    }

    /// Requests shutdown on the first OS signal.
    pub fn listen_for_signals(&self) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            wait_for_os_signal().await;
            coordinator.initiate_shutdown();
        });
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut term), Ok(mut int)) => {
                let name = tokio::select! {
                    _ = term.recv() => "SIGTERM",
                    _ = int.recv() => "SIGINT",
                };
                info!(signal = name, "Signal received");
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Cannot install signal handlers, falling back to Ctrl+C");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(signal = "ctrl-c", "Signal received"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_flag_flips_once() {
        let shutdown = ShutdownCoordinator::new();
        let mut rx = shutdown.subscribe();
        assert!(!shutdown.is_shutdown_initiated());

        shutdown.initiate_shutdown();
        assert!(shutdown.is_shutdown_initiated());
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        shutdown.initiate_shutdown();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_signal_resolves_on_request() {
        let shutdown = ShutdownCoordinator::new();
        let signal = shutdown.shutdown_signal();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.initiate_shutdown();
        });

        tokio::time::timeout(Duration::from_secs(1), signal)
            .await
            .expect("signal did not resolve");
    }

    #[tokio::test]
    async fn test_late_signal_resolves_at_once() {
        let shutdown = ShutdownCoordinator::new();
        shutdown.initiate_shutdown();

        tokio::time::timeout(Duration::from_millis(100), shutdown.shutdown_signal())
            .await
            .expect("late signal did not resolve");
    }

    #[tokio::test]
    async fn test_signal_pending_without_request() {
        let shutdown = ShutdownCoordinator::new();
        let result =
            tokio::time::timeout(Duration::from_millis(30), shutdown.shutdown_signal()).await;
        assert!(result.is_err());
    }
}
