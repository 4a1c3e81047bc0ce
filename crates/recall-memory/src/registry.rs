// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered registry of memory provider descriptors.
//!
//! Registration order is significant: it is the order in which provider
//! contributions appear in every merged output.

use std::collections::HashSet;
use std::sync::Arc;

use recall_core::{MemoryProvider, ProviderMode, RecallError};

/// A named memory provider together with its scheduling mode.
///
/// Immutable once built.
#[derive(Clone)]
pub struct ProviderDescriptor {
    name: String,
    mode: ProviderMode,
    provider: Arc<dyn MemoryProvider>,
}

impl ProviderDescriptor {
    pub fn new(
        name: impl Into<String>,
        mode: ProviderMode,
        provider: Arc<dyn MemoryProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            mode,
            provider,
        }
    }

    /// A provider awaited before the response is emitted.
    pub fn blocking(name: impl Into<String>, provider: impl MemoryProvider + 'static) -> Self {
        Self::new(name, ProviderMode::Blocking, Arc::new(provider))
    }

    /// A provider computed in the background; its last stored result is merged.
    pub fn non_blocking(name: impl Into<String>, provider: impl MemoryProvider + 'static) -> Self {
        Self::new(name, ProviderMode::NonBlocking, Arc::new(provider))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> ProviderMode {
        self.mode
    }

    pub fn provider(&self) -> &Arc<dyn MemoryProvider> {
        &self.provider
    }
}

impl std::fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Read-only ordered list of provider descriptors with unique names.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    descriptors: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Builds a registry, rejecting empty or duplicate names.
    pub fn new(descriptors: Vec<ProviderDescriptor>) -> Result<Self, RecallError> {
        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            if descriptor.name.trim().is_empty() {
                return Err(RecallError::Config(
                    "memory provider name must not be empty".to_string(),
                ));
            }
            if !seen.insert(descriptor.name.as_str()) {
                return Err(RecallError::DuplicateProvider {
                    name: descriptor.name.clone(),
                });
            }
        }
        Ok(Self { descriptors })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// All descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.descriptors.iter()
    }

    /// Blocking descriptors with their registry positions.
    pub fn blocking(&self) -> impl Iterator<Item = (usize, &ProviderDescriptor)> {
        self.with_mode(ProviderMode::Blocking)
    }

    /// Non-blocking descriptors with their registry positions.
    pub fn non_blocking(&self) -> impl Iterator<Item = (usize, &ProviderDescriptor)> {
        self.with_mode(ProviderMode::NonBlocking)
    }

    fn with_mode(&self, mode: ProviderMode) -> impl Iterator<Item = (usize, &ProviderDescriptor)> {
        self.descriptors
            .iter()
            .enumerate()
            .filter(move |(_, d)| d.mode == mode)
    }

    pub fn get(&self, name: &str) -> Option<&ProviderDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
