// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the recall memory orchestrator.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use recall_core::ProviderMode;
use serde::{Deserialize, Serialize};

/// Top-level recall configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecallConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Orchestrator limits and queue sizes.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Memory providers, in merge order.
    #[serde(default)]
    pub providers: Vec<ProviderSpecConfig>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OrchestratorConfig {
    /// Maximum non-blocking provider computations outstanding at once.
    /// Dispatches beyond this bound are skipped for the round.
    #[serde(default = "default_max_background_tasks")]
    pub max_background_tasks: usize,

    /// Capacity of the event bus broadcast buffer.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Depth of the service loop's inbound request queue.
    #[serde(default = "default_request_queue")]
    pub request_queue: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_background_tasks: default_max_background_tasks(),
            event_capacity: default_event_capacity(),
            request_queue: default_request_queue(),
        }
    }
}

fn default_max_background_tasks() -> usize {
    64
}

fn default_event_capacity() -> usize {
    1024
}

fn default_request_queue() -> usize {
    256
}

/// Built-in provider implementations selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// The last `window` messages of the history.
    Window,
    /// A fixed system message with `text`.
    Static,
    /// One system message counting history messages per role.
    Digest,
}

/// One `[[providers]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSpecConfig {
    /// Unique provider name; also the result store key.
    pub name: String,

    /// Blocking or non-blocking scheduling.
    pub mode: ProviderMode,

    /// Which built-in implementation to use.
    pub kind: ProviderKind,

    /// Window size for `window` providers.
    #[serde(default)]
    pub window: Option<usize>,

    /// Message text for `static` providers.
    #[serde(default)]
    pub text: Option<String>,
}
