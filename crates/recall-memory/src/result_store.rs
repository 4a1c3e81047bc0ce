// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Last known good result per provider.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use recall_bus::MemoryResult;
use recall_core::Message;

/// A provider's stored output and the dispatch time it was computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResult {
    pub messages: Vec<Message>,
    pub timestamp: i64,
}

/// Per-provider results with last-write-wins by timestamp.
///
/// Entries are replaced, never removed. Results for different providers
/// never contend; results for the same provider are ordered by timestamp,
/// not by arrival.
#[derive(Debug, Default)]
pub struct ResultStore {
    entries: DashMap<String, StoredResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a result. Returns `true` if it became the stored value.
    ///
    /// A result replaces the stored one when its timestamp is greater than or
    /// equal to the stored timestamp; equal timestamps favour the later write.
    pub fn apply(&self, result: MemoryResult) -> bool {
        let MemoryResult {
            name,
            messages,
            timestamp,
        } = result;
        match self.entries.entry(name) {
            Entry::Occupied(mut entry) => {
                if timestamp >= entry.get().timestamp {
                    entry.insert(StoredResult {
                        messages,
                        timestamp,
                    });
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(StoredResult {
                    messages,
                    timestamp,
                });
                true
            }
        }
    }

    /// The stored messages for `name`, if any.
    pub fn latest(&self, name: &str) -> Option<Vec<Message>> {
        self.entries.get(name).map(|e| e.messages.clone())
    }

    pub fn get(&self, name: &str) -> Option<StoredResult> {
        self.entries.get(name).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn result(name: &str, text: &str, timestamp: i64) -> MemoryResult {
        MemoryResult {
            name: name.to_string(),
            messages: vec![Message::system(text)],
            timestamp,
        }
    }

    fn content(store: &ResultStore, name: &str) -> Option<String> {
        store
            .latest(name)
            .and_then(|m| m.first().map(|m| m.content.clone()))
    }

    #[test]
    fn newer_timestamp_wins_in_order() {
        let store = ResultStore::new();
        assert!(store.apply(result("x", "old", 1)));
        assert!(store.apply(result("x", "new", 2)));
        assert_eq!(content(&store, "x").as_deref(), Some("new"));
    }

    #[test]
    fn older_timestamp_arriving_late_is_ignored() {
        let store = ResultStore::new();
        assert!(store.apply(result("x", "new", 2)));
        assert!(!store.apply(result("x", "old", 1)));
        assert_eq!(content(&store, "x").as_deref(), Some("new"));
        assert_eq!(store.get("x").unwrap().timestamp, 2);
    }

    #[test]
    fn equal_timestamp_favours_later_write() {
        let store = ResultStore::new();
        store.apply(result("x", "first", 5));
        assert!(store.apply(result("x", "second", 5)));
        assert_eq!(content(&store, "x").as_deref(), Some("second"));
    }

    #[test]
    fn providers_are_independent() {
        let store = ResultStore::new();
        store.apply(result("a", "a1", 10));
        store.apply(result("b", "b1", 1));
        assert_eq!(store.len(), 2);
        assert_eq!(content(&store, "a").as_deref(), Some("a1"));
        assert_eq!(content(&store, "b").as_deref(), Some("b1"));
        assert!(store.latest("c").is_none());
    }

    #[test]
    fn concurrent_writers_converge_on_max_timestamp() {
        let store = Arc::new(ResultStore::new());
        let handles: Vec<_> = (0..16)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let ts = (i * 16 + t) as i64;
                        store.apply(result("x", &ts.to_string(), ts));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get("x").unwrap().timestamp, 50 * 16 - 1);
        assert_eq!(content(&store, "x").as_deref(), Some("799"));
    }
}
