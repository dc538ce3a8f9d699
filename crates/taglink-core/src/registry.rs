// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bookkeeping of subscribed tags.
//!
//! A [`TagRegistry`] maps each subscribed tag to its server-side item handle.
//! A tag is present exactly when the server holds a live subscription for it.

use std::collections::HashMap;

use crate::error::{SubscribeError, TagResult};
use crate::transport::{GroupHandle, ItemHandle, Transport};

/// Subscribed tags of one session and their item handles.
#[derive(Debug)]
pub struct TagRegistry {
    group: GroupHandle,
    items: HashMap<String, ItemHandle>,
}

impl TagRegistry {
    /// Creates an empty registry over a server-side item group.
    pub fn new(group: GroupHandle) -> Self {
        Self {
            group,
            items: HashMap::new(),
        }
    }

    /// Returns the server-side group handle.
    pub fn group(&self) -> GroupHandle {
        self.group
    }

    /// Subscribes every tag independently.
    ///
    /// Tags already present are left alone. Failures do not stop the
    /// remaining tags; they come back together in one [`SubscribeError`].
    pub async fn add<S: AsRef<str>>(
        &mut self,
        transport: &dyn Transport,
        tags: &[S],
    ) -> TagResult<()> {
        let mut failures = Vec::new();

        for tag in tags {
            let tag = tag.as_ref();
            if self.items.contains_key(tag) {
                continue;
            }
            match transport.add_item(self.group, tag).await {
                Ok(handle) => {
                    tracing::debug!(tag = %tag, handle = %handle, "Tag subscribed");
                    self.items.insert(tag.to_string(), handle);
                }
                Err(e) => {
                    tracing::warn!(tag = %tag, error = %e, "Cannot subscribe tag");
                    failures.push((tag.to_string(), e.to_string()));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SubscribeError { failures }.into())
        }
    }

    /// Unsubscribes a tag. Unknown tags are ignored.
    ///
    /// The entry is dropped even if the server call fails, since a failed
    /// release means the session is already gone.
    pub async fn remove(&mut self, transport: &dyn Transport, tag: &str) {
        let Some(handle) = self.items.remove(tag) else {
            return;
        };
        if let Err(e) = transport.remove_item(self.group, handle).await {
            tracing::debug!(tag = %tag, error = %e, "Release of tag failed");
        }
    }

    /// Returns the item handle for a tag.
    pub fn handle(&self, tag: &str) -> Option<ItemHandle> {
        self.items.get(tag).copied()
    }

    /// Returns `true` if the tag is subscribed.
    pub fn contains(&self, tag: &str) -> bool {
        self.items.contains_key(tag)
    }

    /// Returns the subscribed tag names in no particular order.
    pub fn tags(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    /// Returns the tags with their handles, sorted by name.
    pub fn entries(&self) -> Vec<(String, ItemHandle)> {
        let mut entries: Vec<_> = self.items.iter().map(|(t, h)| (t.clone(), *h)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Number of subscribed tags.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Releases every item and the group itself.
    pub async fn close(&mut self, transport: &dyn Transport) {
        self.items.clear();
        if let Err(e) = transport.remove_group(self.group).await {
            tracing::debug!(error = %e, "Release of item group failed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
