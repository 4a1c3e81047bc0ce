// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end orchestrator tests.
//!
//! `OrchestratorHarness` assembles a registry, fresh shared state and an
//! event bus, and subscribes to the bus before anything is published so
//! every event of a test is observable.

use recall_bus::{EventBus, MemoryEvent, ResourcesPayload};
use recall_core::{MemoryProvider, Message, RecallError, RequestId};
use recall_memory::{
    MemoryOrchestrator, OrchestratorOptions, ProviderDescriptor, ProviderRegistry, SharedState,
};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// Builder for [`OrchestratorHarness`].
pub struct OrchestratorHarnessBuilder {
    descriptors: Vec<ProviderDescriptor>,
    options: OrchestratorOptions,
    state: SharedState,
    event_capacity: usize,
}

impl OrchestratorHarnessBuilder {
    fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            options: OrchestratorOptions::default(),
            state: SharedState::default(),
            event_capacity: 1024,
        }
    }

    /// Append a blocking provider.
    pub fn blocking(mut self, name: &str, provider: impl MemoryProvider + 'static) -> Self {
        self.descriptors
            .push(ProviderDescriptor::blocking(name, provider));
        self
    }

    /// Append a non-blocking provider.
    pub fn non_blocking(mut self, name: &str, provider: impl MemoryProvider + 'static) -> Self {
        self.descriptors
            .push(ProviderDescriptor::non_blocking(name, provider));
        self
    }

    pub fn max_background_tasks(mut self, max: usize) -> Self {
        self.options.max_background_tasks = max;
        self
    }

    /// Reuse existing shared state, e.g. to simulate a restart of the engine
    /// over the same stores.
    pub fn with_state(mut self, state: SharedState) -> Self {
        self.state = state;
        self
    }

    /// Build the harness. Fails on duplicate or empty provider names.
    pub fn build(self) -> Result<OrchestratorHarness, RecallError> {
        let registry = ProviderRegistry::new(self.descriptors)?;
        let bus = EventBus::new(self.event_capacity);
        let events = bus.subscribe();
        let orchestrator = MemoryOrchestrator::new(registry, self.state, bus, self.options);
        Ok(OrchestratorHarness {
            orchestrator,
            events,
        })
    }
}

/// A wired orchestrator plus an event subscription.
pub struct OrchestratorHarness {
    pub orchestrator: MemoryOrchestrator,
    events: broadcast::Receiver<MemoryEvent>,
}

impl OrchestratorHarness {
    pub fn builder() -> OrchestratorHarnessBuilder {
        OrchestratorHarnessBuilder::new()
    }

    /// Sends one upstream request through the orchestrator.
    pub async fn send(&self, id: &str, history: &[Message]) -> Option<ResourcesPayload> {
        self.orchestrator.handle(request(id, history)).await
    }

    /// Waits for all outstanding non-blocking computations.
    pub async fn drain(&self) {
        self.orchestrator.drain_background().await;
    }

    /// Returns every event published since the last call.
    pub fn events(&mut self) -> Vec<MemoryEvent> {
        let mut out = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => out.push(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        out
    }
}

/// Builds an upstream request payload.
pub fn request(id: &str, history: &[Message]) -> ResourcesPayload {
    ResourcesPayload::new(RequestId::from(id), history.to_vec())
}

/// Message contents, in order.
pub fn contents(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(|m| m.content.as_str()).collect()
}
