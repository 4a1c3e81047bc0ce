// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monotonic millisecond clock for memory-result timestamps.

use std::time::Instant;

/// Epoch-millisecond clock that never runs backwards.
///
/// Anchored to wall-clock time at construction and advanced by
/// [`Instant`], so wall-clock adjustments cannot reorder results.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    anchor_ms: i64,
    started: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            anchor_ms: chrono::Utc::now().timestamp_millis(),
            started: Instant::now(),
        }
    }

    /// Milliseconds since the Unix epoch, monotonic within this process.
    pub fn now_millis(&self) -> i64 {
        let elapsed = i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.anchor_ms.saturating_add(elapsed)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
