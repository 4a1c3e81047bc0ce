// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for recall integration tests.
//!
//! Provides scripted memory providers and an orchestrator harness for fast,
//! deterministic tests.
//!
//! # Components
//!
//! - [`MockMemoryProvider`] - provider with fixed output, failure, panic, delay and gating
//! - [`OrchestratorHarness`] - orchestrator plus an event subscription and request helpers

pub mod harness;
pub mod mock_provider;

pub use harness::{contents, request, OrchestratorHarness, OrchestratorHarnessBuilder};
pub use mock_provider::{CallCounter, Gate, MockMemoryProvider};
