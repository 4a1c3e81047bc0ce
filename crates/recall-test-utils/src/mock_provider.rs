// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted memory provider for deterministic testing.
//!
//! `MockMemoryProvider` implements `MemoryProvider` with a fixed behavior,
//! an optional delay and an optional [`Gate`] that holds every call until
//! the test opens it. A [`CallCounter`] stays with the test after the
//! provider has moved into a registry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use recall_core::{MemoryProvider, Message, RecallError};
use tokio::sync::watch;

enum Behavior {
    Return(Vec<Message>),
    Numbered(String),
    Fail(String),
    Panic(String),
}

/// Shared count of `compute` invocations.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Waits until at least `n` calls have started.
    pub async fn wait_for(&self, n: usize) {
        while self.get() < n {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    fn bump(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// A one-shot latch: closed until [`Gate::open`], then open forever.
#[derive(Debug, Clone)]
pub struct Gate(Arc<watch::Sender<bool>>);

impl Gate {
    pub fn new() -> Self {
        Self(Arc::new(watch::Sender::new(false)))
    }

    pub fn open(&self) {
        self.0.send_replace(true);
    }

    pub async fn wait(&self) {
        let mut rx = self.0.subscribe();
        // The sender lives as long as self, so the only exit is an open gate.
        let _ = rx.wait_for(|opened| *opened).await;
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

/// A mock memory provider with scripted output.
pub struct MockMemoryProvider {
    behavior: Behavior,
    delay: Option<Duration>,
    gate: Option<Gate>,
    gate_first_call_only: bool,
    calls: CallCounter,
}

impl MockMemoryProvider {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            delay: None,
            gate: None,
            gate_first_call_only: false,
            calls: CallCounter::default(),
        }
    }

    /// Returns one system message per text on every call.
    ///
    /// The messages are created once, so repeated calls yield identical ids.
    pub fn returning(texts: &[&str]) -> Self {
        Self::with_behavior(Behavior::Return(
            texts.iter().map(|t| Message::system(*t)).collect(),
        ))
    }

    /// Returns a single message `"{prefix}{n}"` where `n` is the 1-based call number.
    pub fn numbered(prefix: &str) -> Self {
        Self::with_behavior(Behavior::Numbered(prefix.to_string()))
    }

    /// Fails every call with a compute error.
    pub fn failing(message: &str) -> Self {
        Self::with_behavior(Behavior::Fail(message.to_string()))
    }

    /// Panics on every call.
    pub fn panicking(message: &str) -> Self {
        Self::with_behavior(Behavior::Panic(message.to_string()))
    }

    /// Sleeps before producing output.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Holds every call until `gate` is opened.
    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Holds only the first call until `gate` is opened; later calls run freely.
    pub fn with_first_call_gate(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self.gate_first_call_only = true;
        self
    }

    /// Handle to this provider's call count.
    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl MemoryProvider for MockMemoryProvider {
    async fn compute(&self, _history: &[Message]) -> Result<Vec<Message>, RecallError> {
        let call = self.calls.bump();

        if let Some(gate) = &self.gate
            && (call == 1 || !self.gate_first_call_only)
        {
            gate.wait().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Return(messages) => Ok(messages.clone()),
            Behavior::Numbered(prefix) => Ok(vec![Message::system(format!("{prefix}{call}"))]),
            Behavior::Fail(message) => Err(RecallError::compute("mock", message.clone())),
            Behavior::Panic(message) => panic!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returning_yields_identical_messages() {
        let provider = MockMemoryProvider::returning(&["a", "b"]);
        let first = provider.compute(&[]).await.unwrap();
        let second = provider.compute(&[]).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(provider.calls().get(), 2);
    }

    #[tokio::test]
    async fn numbered_counts_calls() {
        let provider = MockMemoryProvider::numbered("R");
        assert_eq!(provider.compute(&[]).await.unwrap()[0].content, "R1");
        assert_eq!(provider.compute(&[]).await.unwrap()[0].content, "R2");
    }

    #[tokio::test]
    async fn failing_returns_compute_error() {
        let provider = MockMemoryProvider::failing("boom");
        let err = provider.compute(&[]).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn gate_holds_until_opened() {
        let gate = Gate::new();
        let provider = Arc::new(MockMemoryProvider::returning(&["x"]).with_gate(gate.clone()));
        let calls = provider.calls();

        let task = tokio::spawn({
            let provider = Arc::clone(&provider);
            async move { provider.compute(&[]).await }
        });
        calls.wait_for(1).await;
        assert!(!task.is_finished());

        gate.open();
        let out = task.await.unwrap().unwrap();
        assert_eq!(out[0].content, "x");
    }

    #[tokio::test]
    async fn first_call_gate_releases_later_calls() {
        let gate = Gate::new();
        let provider =
            Arc::new(MockMemoryProvider::returning(&["x"]).with_first_call_gate(gate.clone()));

        let first = tokio::spawn({
            let provider = Arc::clone(&provider);
            async move { provider.compute(&[]).await }
        });
        provider.calls().wait_for(1).await;

        let second = provider.compute(&[]).await.unwrap();
        assert_eq!(second[0].content, "x");
        assert!(!first.is_finished());

        gate.open();
        assert!(first.await.unwrap().is_ok());
    }
}
