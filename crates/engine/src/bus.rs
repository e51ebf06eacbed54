// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process publish/subscribe for run status, messages, actions, and
//! attention changes. Nothing is persisted; a consumer that misses events
//! re-reads through the HTTP surface.

use std::collections::HashMap;

use parking_lot::Mutex;
use sb_core::{BusEvent, ThreadId};
use tokio::sync::broadcast;

const BUS_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BusEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }

    /// Fire-and-forget; an empty subscriber set is not an error.
    pub fn publish(&self, event: BusEvent) {
        tracing::debug!(topic = event.topic(), thread = %event.thread_id(), "bus event");
        let _ = self.tx.send(event);
    }
}

/// Per-thread suppression of duplicate `attention.updated` emissions.
///
/// Owned state with an explicit constructor; the server builds one at
/// startup and threads it through, nothing initializes at module load.
#[derive(Default)]
pub struct AttentionCache {
    last: Mutex<HashMap<ThreadId, bool>>,
}

impl AttentionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `attention.updated` unless the value matches the last one
    /// emitted for this thread. Returns whether an event went out.
    pub fn update(&self, bus: &EventBus, thread_id: &ThreadId, needs_attention: bool) -> bool {
        let mut last = self.last.lock();
        if last.get(thread_id) == Some(&needs_attention) {
            return false;
        }
        last.insert(thread_id.clone(), needs_attention);
        drop(last);
        bus.publish(BusEvent::AttentionUpdated {
            thread_id: thread_id.clone(),
            needs_attention,
        });
        true
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
