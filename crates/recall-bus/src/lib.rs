// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Internal typed event bus for the recall memory orchestrator.
//!
//! Every event the orchestrator produces (build-request, memory-result,
//! build-response and the final resources-response) is published here so
//! that hosts, tests and tracing sinks can observe the pipeline without
//! being on its critical path.

pub mod events;

use tokio::sync::broadcast;
use tracing::trace;

pub use events::{MemoryEvent, MemoryResult, ResourcesPayload};

/// Default broadcast capacity when none is configured.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Broadcast bus carrying [`MemoryEvent`]s.
///
/// Publishing never blocks. Subscribers that fall more than `capacity`
/// events behind observe a lag error and skip ahead.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MemoryEvent>,
}

impl EventBus {
    /// Creates a bus with room for `capacity` undelivered events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event, returning how many subscribers received it.
    pub fn publish(&self, event: MemoryEvent) -> usize {
        let kind = event.event_type();
        match self.tx.send(event) {
            Ok(receivers) => {
                trace!(event = kind, receivers, "event published");
                receivers
            }
            Err(_) => {
                trace!(event = kind, "event published with no subscribers");
                0
            }
        }
    }

    /// Subscribes to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<MemoryEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
