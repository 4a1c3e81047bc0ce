// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions implemented by memory sources.

pub mod provider;

pub use provider::{FnProvider, MemoryProvider};
