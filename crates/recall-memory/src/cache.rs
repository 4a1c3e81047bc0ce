// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fingerprint-keyed cache of merged build outputs.

use std::sync::Arc;

use dashmap::DashMap;
use recall_core::Message;

use crate::fingerprint::Fingerprint;

/// Maps a history fingerprint to the merged output built for it.
///
/// The first write for a fingerprint wins and is never replaced or
/// invalidated, including when non-blocking results change afterwards.
/// There is no eviction.
#[derive(Debug, Default)]
pub struct BuildCache {
    entries: DashMap<Fingerprint, Arc<Vec<Message>>>,
}

impl BuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<Vec<Message>>> {
        self.entries.get(fingerprint).map(|e| Arc::clone(e.value()))
    }

    /// Stores `merged` unless the fingerprint is already cached.
    ///
    /// Returns `true` if this call populated the entry.
    pub fn insert(&self, fingerprint: Fingerprint, merged: Vec<Message>) -> bool {
        let mut inserted = false;
        self.entries.entry(fingerprint).or_insert_with(|| {
            inserted = true;
            Arc::new(merged)
        });
        inserted
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
