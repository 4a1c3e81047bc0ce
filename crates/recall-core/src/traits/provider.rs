// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The memory provider seam.
//!
//! Providers are opaque to the orchestrator: given an ordered history they
//! return an ordered list of messages to contribute, or fail.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::RecallError;
use crate::types::Message;

/// A memory source that turns a conversation history into context messages.
///
/// Implementations must not rely on being called once per request: cached
/// builds skip blocking providers entirely, and non-blocking providers may
/// be skipped when the background pool is saturated.
#[async_trait]
pub trait MemoryProvider: Send + Sync {
    /// Computes this provider's contribution for `history`.
    ///
    /// Returns an empty vec when the provider has nothing to add.
    async fn compute(&self, history: &[Message]) -> Result<Vec<Message>, RecallError>;
}

type BoxedCompute = Box<
    dyn Fn(Vec<Message>) -> Pin<Box<dyn Future<Output = Result<Vec<Message>, RecallError>> + Send>>
        + Send
        + Sync,
>;

/// Adapts a plain async function into a [`MemoryProvider`].
///
/// The closure receives an owned copy of the history so the returned future
/// can be `'static`.
pub struct FnProvider {
    compute: BoxedCompute,
}

impl FnProvider {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<Message>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Message>, RecallError>> + Send + 'static,
    {
        Self {
            compute: Box::new(move |history| Box::pin(f(history))),
        }
    }
}

impl std::fmt::Debug for FnProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl MemoryProvider for FnProvider {
    async fn compute(&self, history: &[Message]) -> Result<Vec<Message>, RecallError> {
        (self.compute)(history.to_vec()).await
    }
}
