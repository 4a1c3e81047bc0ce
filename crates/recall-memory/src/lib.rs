// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory build orchestrator.
//!
//! Intercepts upstream resource requests, asks every configured memory
//! provider for a contribution, merges the contributions in registry order
//! and emits exactly one augmented response per request id.
//!
//! ## Architecture
//!
//! - **fingerprint**: SHA-256 content hash of an ordered history (cache key)
//! - **ProviderRegistry**: ordered, uniquely named provider descriptors
//! - **ResultStore**: last-write-wins per-provider results
//! - **BuildCache**: fingerprint to merged output, first writer wins
//! - **RequestLedger**: in-flight and processed request ids
//! - **MemoryOrchestrator**: intake, fan-out, merge and forwarding
//! - **builtin**: configuration-driven providers (window, static, digest)

pub mod builtin;
pub mod cache;
pub mod clock;
pub mod fingerprint;
pub mod ledger;
pub mod orchestrator;
pub mod recording;
pub mod registry;
pub mod result_store;

pub use builtin::{registry_from_config, DigestProvider, StaticProvider, WindowProvider};
pub use cache::BuildCache;
pub use clock::MonotonicClock;
pub use fingerprint::{fingerprint, Fingerprint};
pub use ledger::{Admission, RequestLedger};
pub use orchestrator::{MemoryOrchestrator, OrchestratorOptions, OrchestratorStats, SharedState};
pub use registry::{ProviderDescriptor, ProviderRegistry};
pub use result_store::{ResultStore, StoredResult};
