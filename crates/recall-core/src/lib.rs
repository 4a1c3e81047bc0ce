// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the recall memory orchestrator.
//!
//! This crate holds the pieces every other crate in the workspace agrees on:
//! the conversational [`Message`] model, the [`MemoryProvider`] trait that
//! memory sources implement, and the shared [`RecallError`] type.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RecallError;
pub use traits::{FnProvider, MemoryProvider};
pub use types::{Message, ProviderMode, RequestId, Role};
