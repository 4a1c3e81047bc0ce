// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the recall memory orchestrator.

use thiserror::Error;

/// The primary error type used across the recall workspace.
#[derive(Debug, Error)]
pub enum RecallError {
    /// Configuration errors (invalid provider spec, bad limits).
    #[error("configuration error: {0}")]
    Config(String),

    /// A memory provider's compute function failed or panicked.
    ///
    /// Never fatal to a request: the orchestrator logs it and treats the
    /// provider as contributing nothing for the round.
    #[error("provider `{provider}` failed: {message}")]
    ProviderCompute {
        provider: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A message history could not be serialized for fingerprinting.
    ///
    /// Indicates an upstream contract violation and is fatal for the request.
    #[error("fingerprint error: {source}")]
    Fingerprint { source: serde_json::Error },

    /// Two provider descriptors share a name within one registry.
    #[error("duplicate memory provider name `{name}`")]
    DuplicateProvider { name: String },

    /// A service queue was closed while the orchestrator still needed it.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecallError {
    /// Convenience constructor for a provider failure without an underlying source.
    pub fn compute(provider: impl Into<String>, message: impl Into<String>) -> Self {
        RecallError::ProviderCompute {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }
}
