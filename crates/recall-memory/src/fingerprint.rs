// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content fingerprint of an ordered message history.

use recall_core::{Message, RecallError};
use sha2::{Digest, Sha256};

/// SHA-256 digest identifying a message history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Computes the fingerprint of `history`.
///
/// Each message is serialized to JSON and length-prefixed before hashing, so
/// the digest depends on message order and message boundaries. Pure: the
/// same history always yields the same fingerprint.
pub fn fingerprint(history: &[Message]) -> Result<Fingerprint, RecallError> {
    let mut hasher = Sha256::new();
    hasher.update((history.len() as u64).to_le_bytes());
    for message in history {
        let bytes =
            serde_json::to_vec(message).map_err(|source| RecallError::Fingerprint { source })?;
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(Fingerprint(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use recall_core::Role;

    fn message(id: &str, role: Role, content: &str) -> Message {
        Message {
            id: id.to_string(),
            role,
            content: content.to_string(),
            created_at: "2026-03-01T00:00:00Z".to_string(),
            metadata: None,
        }
    }

    #[test]
    fn empty_history_has_stable_fingerprint() {
        let a = fingerprint(&[]).unwrap();
        let b = fingerprint(&[]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 64);
    }

    #[test]
    fn order_changes_fingerprint() {
        let u1 = message("1", Role::User, "hello");
        let a1 = message("2", Role::Assistant, "hi there");
        let forward = fingerprint(&[u1.clone(), a1.clone()]).unwrap();
        let reversed = fingerprint(&[a1, u1]).unwrap();
        assert_ne!(forward, reversed);
    }

    #[test]
    fn content_boundaries_are_unambiguous() {
        let split = [
            message("1", Role::User, "ab"),
            message("2", Role::User, "c"),
        ];
        let shifted = [
            message("1", Role::User, "a"),
            message("2", Role::User, "bc"),
        ];
        assert_ne!(fingerprint(&split).unwrap(), fingerprint(&shifted).unwrap());
    }

    #[test]
    fn metadata_participates() {
        let plain = message("1", Role::User, "x");
        let tagged = plain
            .clone()
            .with_metadata(serde_json::json!({"channel": "cli"}));
        assert_ne!(fingerprint(&[plain]).unwrap(), fingerprint(&[tagged]).unwrap());
    }

    #[test]
    fn display_is_hex() {
        let fp = fingerprint(&[message("1", Role::User, "x")]).unwrap();
        assert_eq!(fp.to_string(), fp.to_hex());
        assert_eq!(hex::decode(fp.to_hex()).unwrap(), fp.as_bytes().to_vec());
    }

    fn history_strategy() -> impl Strategy<Value = Vec<Message>> {
        prop::collection::vec("[a-z]{0,12}", 0..8).prop_map(|texts| {
            texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| message(&i.to_string(), Role::User, &text))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn fingerprint_is_pure(history in history_strategy()) {
            prop_assert_eq!(fingerprint(&history).unwrap(), fingerprint(&history).unwrap());
        }

        #[test]
        fn swapping_distinct_messages_changes_fingerprint(
            history in history_strategy(),
            i in 0usize..8,
            j in 0usize..8,
        ) {
            prop_assume!(history.len() >= 2);
            let i = i % history.len();
            let j = j % history.len();
            prop_assume!(history[i] != history[j]);
            let mut swapped = history.clone();
            swapped.swap(i, j);
            prop_assert_ne!(fingerprint(&history).unwrap(), fingerprint(&swapped).unwrap());
        }
    }
}
