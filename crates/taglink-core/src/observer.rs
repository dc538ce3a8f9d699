// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Change notification for single tags.
//!
//! An [`Observer`] polls one tag per [`observe`](Observer::observe) call,
//! feeds each value to its [`Trigger`], and wakes every subscriber when the
//! trigger fires.
//!
//! Subscriber channels hold at most one pending signal. A subscriber that has
//! not consumed the previous signal sees a single "changed" wake-up rather
//! than a backlog, and the notifier never waits on it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{Instant, MissedTickBehavior};

use crate::cache::MIN_INTERVAL;
use crate::connection::TagConnection;
use crate::control::Closer;
use crate::types::Value;

// =============================================================================
// Trigger
// =============================================================================

/// Decides whether a newly read value warrants a notification.
pub trait Trigger: Send {
    /// Returns `true` if subscribers should be notified about `value`.
    fn fire(&self, value: &Value) -> bool;

    /// Records `value` after a notification.
    fn update(&mut self, value: &Value);
}

/// Fires whenever the value differs from the last one seen.
///
/// The first read always fires unless the tag reads as null.
#[derive(Debug, Clone, Default)]
pub struct OnChange {
    last: Value,
}

impl OnChange {
    /// Creates a trigger with no previous value.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Trigger for OnChange {
    fn fire(&self, value: &Value) -> bool {
        *value != self.last
    }

    fn update(&mut self, value: &Value) {
        self.last = value.clone();
    }
}

/// Fires whenever the value equals a fixed target. Holds no other state.
#[derive(Debug, Clone)]
pub struct OnValue {
    target: Value,
}

impl OnValue {
    /// Creates a trigger for `target`.
    pub fn new(target: impl Into<Value>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Returns the target value.
    pub fn target(&self) -> &Value {
        &self.target
    }
}

impl Trigger for OnValue {
    fn fire(&self, value: &Value) -> bool {
        *value == self.target
    }

    fn update(&mut self, _value: &Value) {}
}

// =============================================================================
// Observer
// =============================================================================

/// Polls tags and notifies subscribers when the trigger fires.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use taglink_core::{Observer, OnChange, TagConnection};
///
/// # async fn demo(conn: Arc<dyn TagConnection>) {
/// let observer = Observer::new(OnChange::new(), conn);
/// let mut changes = observer.channel();
/// let _closer = observer.observe("numeric.saw.float", Duration::from_millis(100));
///
/// while changes.recv().await.is_some() {
///     println!("changed");
/// }
/// # }
/// ```
pub struct Observer {
    shared: Arc<Shared>,
    closers: Mutex<Vec<Closer>>,
}

struct Shared {
    trigger: Mutex<Box<dyn Trigger>>,
    conn: Arc<dyn TagConnection>,
    subscribers: Mutex<Vec<mpsc::Sender<bool>>>,
}

impl Shared {
    fn notify(&self) -> usize {
        let mut delivered = 0;
        self.subscribers.lock().retain(|tx| match tx.try_send(true) {
            Ok(()) => {
                delivered += 1;
                true
            }
            // A signal is already pending; it covers this one too.
            Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Closed(_)) => false,
        });
        delivered
    }

    /// Evaluates the trigger for one value; returns whether it fired.
    fn evaluate(&self, value: &Value) -> bool {
        let mut trigger = self.trigger.lock();
        if !trigger.fire(value) {
            return false;
        }
        trigger.update(value);
        true
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("subscribers", &self.subscriber_count())
            .field("tasks", &self.closers.lock().len())
            .finish()
    }
}

impl Observer {
    /// Creates an observer over `conn`.
    pub fn new(trigger: impl Trigger + 'static, conn: Arc<dyn TagConnection>) -> Self {
        Self {
            shared: Arc::new(Shared {
                trigger: Mutex::new(Box::new(trigger)),
                conn,
                subscribers: Mutex::new(Vec::new()),
            }),
            closers: Mutex::new(Vec::new()),
        }
    }

    /// Registers a subscriber and returns its receiver.
    ///
    /// The channel has capacity one and carries wake-ups only. Dropping the
    /// receiver unregisters it on the next notification.
    pub fn channel(&self) -> mpsc::Receiver<bool> {
        let (tx, rx) = mpsc::channel(1);
        self.shared.subscribers.lock().push(tx);
        rx
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.lock().len()
    }

    /// Wakes every subscriber without blocking.
    ///
    /// Returns how many subscribers received a new signal; subscribers that
    /// still hold an unconsumed one are not counted.
    pub fn notify(&self) -> usize {
        self.shared.notify()
    }

    /// Starts polling `tag` every `interval`.
    ///
    /// Each call starts an independent task. The returned [`Closer`] stops
    /// only that task; [`close`](Self::close) stops all of them.
    pub fn observe(&self, tag: impl Into<String>, interval: Duration) -> Closer {
        let tag = tag.into();
        let interval = interval.max(MIN_INTERVAL);
        let shared = Arc::clone(&self.shared);

        let closer = Closer::spawn(move |mut stop| async move {
            tracing::debug!(tag = %tag, interval_ms = interval.as_millis() as u64, "Observing tag");

            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop => break,
                    _ = ticker.tick() => {
                        let value = shared.conn.read_item(&tag).await.value;
                        if shared.evaluate(&value) {
                            tracing::trace!(tag = %tag, value = %value, "Trigger fired");
                            shared.notify();
                        }
                    }
                }
            }

            tracing::debug!(tag = %tag, "Observation stopped");
        });

        self.closers.lock().push(closer.clone());
        closer
    }

    /// Stops every observation task and waits for them to exit.
    pub async fn close(&self) {
        let closers = std::mem::take(&mut *self.closers.lock());
        for closer in closers {
            closer.close().await;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
