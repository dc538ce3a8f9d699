// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Stop handle for background tasks.
//!
//! Every periodic task is paired with a [`Closer`]. [`Closer::close`] sends
//! the stop signal and then waits for the task to finish, so nothing the task
//! owns is touched after `close` returns.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

/// Stop signal handed to a task. Resolves on `close` or when every
/// [`Closer`] clone is dropped.
pub type StopSignal = oneshot::Receiver<()>;

struct Running {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Handle that stops a background task and waits for it.
///
/// Clones share the task. Dropping the last clone stops the task without
/// waiting.
#[derive(Clone)]
#[must_use = "dropping every Closer stops its task"]
pub struct Closer {
    running: Arc<Mutex<Option<Running>>>,
}

impl std::fmt::Debug for Closer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closer").finish_non_exhaustive()
    }
}

impl Closer {
    /// Spawns `task` on the runtime, passing it the stop signal.
    pub fn spawn<F, Fut>(task: F) -> Self
    where
        F: FnOnce(StopSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop, signal) = oneshot::channel();
        let handle = tokio::spawn(task(signal));
        Self {
            running: Arc::new(Mutex::new(Some(Running { stop, handle }))),
        }
    }

    /// Stops the task and waits until it has exited.
    ///
    /// Later calls, from any clone, return immediately.
    pub async fn close(&self) {
        let Some(running) = self.running.lock().await.take() else {
            return;
        };
        // The task may already be gone; the join below still applies.
        let _ = running.stop.send(());
        if let Err(e) = running.handle.await {
            tracing::warn!(error = %e, "Background task ended abnormally");
        }
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub async fn is_closed(&self) -> bool {
        self.running.lock().await.is_none()
    }
}

// =============================================================================
// Tests
// =============================================================================
