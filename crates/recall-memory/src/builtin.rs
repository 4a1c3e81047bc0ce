// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in memory providers selectable from `[[providers]]` configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use recall_config::model::{ProviderKind, ProviderSpecConfig};
use recall_core::{MemoryProvider, Message, RecallError};

use crate::registry::{ProviderDescriptor, ProviderRegistry};

/// Contributes the last `size` messages of the history.
#[derive(Debug, Clone)]
pub struct WindowProvider {
    size: usize,
}

impl WindowProvider {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

#[async_trait]
impl MemoryProvider for WindowProvider {
    async fn compute(&self, history: &[Message]) -> Result<Vec<Message>, RecallError> {
        let start = history.len().saturating_sub(self.size);
        Ok(history[start..].to_vec())
    }
}

/// Contributes one fixed system message.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    message: Message,
}

impl StaticProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            message: Message::system(text),
        }
    }
}

#[async_trait]
impl MemoryProvider for StaticProvider {
    async fn compute(&self, _history: &[Message]) -> Result<Vec<Message>, RecallError> {
        Ok(vec![self.message.clone()])
    }
}

/// Contributes a one-line summary of how many messages each role authored.
///
/// Contributes nothing for an empty history.
#[derive(Debug, Clone, Default)]
pub struct DigestProvider;

#[async_trait]
impl MemoryProvider for DigestProvider {
    async fn compute(&self, history: &[Message]) -> Result<Vec<Message>, RecallError> {
        if history.is_empty() {
            return Ok(vec![]);
        }
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for message in history {
            *counts.entry(message.role.to_string()).or_default() += 1;
        }
        let parts: Vec<String> = counts
            .iter()
            .map(|(role, count)| format!("{count} {role}"))
            .collect();
        Ok(vec![Message::system(format!(
            "Conversation so far: {} messages ({})",
            history.len(),
            parts.join(", ")
        ))])
    }
}

/// Builds a registry from configuration, preserving file order.
pub fn registry_from_config(specs: &[ProviderSpecConfig]) -> Result<ProviderRegistry, RecallError> {
    let descriptors = specs
        .iter()
        .map(|spec| {
            let provider: Arc<dyn MemoryProvider> = match spec.kind {
                ProviderKind::Window => {
                    let size = spec.window.ok_or_else(|| {
                        RecallError::Config(format!(
                            "provider `{}` of kind window requires `window`",
                            spec.name
                        ))
                    })?;
                    Arc::new(WindowProvider::new(size))
                }
                ProviderKind::Static => {
                    let text = spec.text.clone().ok_or_else(|| {
                        RecallError::Config(format!(
                            "provider `{}` of kind static requires `text`",
                            spec.name
                        ))
                    })?;
                    Arc::new(StaticProvider::new(text))
                }
                ProviderKind::Digest => Arc::new(DigestProvider),
            };
            Ok(ProviderDescriptor::new(spec.name.clone(), spec.mode, provider))
        })
        .collect::<Result<Vec<_>, RecallError>>()?;
    ProviderRegistry::new(descriptors)
}
