// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event contracts consumed and produced by the orchestrator.
//!
//! Wire names match the agent pipeline: the upstream stage delivers an
//! `agent.resources-response`, the orchestrator re-emits one with memory
//! merged in, and uses `build-request`, `memory-result` and
//! `build-response` internally.

use recall_core::{Message, RequestId};
use serde::{Deserialize, Serialize};

/// Payload shared by resources-response, build-request and build-response.
///
/// Fields the orchestrator does not understand are kept in `extra` and
/// passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesPayload {
    pub request_id: RequestId,
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ResourcesPayload {
    pub fn new(request_id: RequestId, messages: Vec<Message>) -> Self {
        Self {
            request_id,
            messages,
            extra: serde_json::Map::new(),
        }
    }

    /// Same request and passthrough fields, different messages.
    pub fn with_messages(&self, messages: Vec<Message>) -> Self {
        Self {
            request_id: self.request_id.clone(),
            messages,
            extra: self.extra.clone(),
        }
    }
}

/// One provider's output for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryResult {
    /// Provider name from the registry.
    pub name: String,
    pub messages: Vec<Message>,
    /// Dispatch time in epoch milliseconds; ordering key for last-write-wins.
    pub timestamp: i64,
}

/// Events flowing through the memory build pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum MemoryEvent {
    #[serde(rename = "agent.resources-response")]
    ResourcesResponse(ResourcesPayload),
    #[serde(rename = "build-request")]
    BuildRequest(ResourcesPayload),
    #[serde(rename = "memory-result")]
    MemoryResult(MemoryResult),
    #[serde(rename = "build-response")]
    BuildResponse(ResourcesPayload),
}

impl MemoryEvent {
    /// Wire name of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            MemoryEvent::ResourcesResponse(_) => "agent.resources-response",
            MemoryEvent::BuildRequest(_) => "build-request",
            MemoryEvent::MemoryResult(_) => "memory-result",
            MemoryEvent::BuildResponse(_) => "build-response",
        }
    }

    /// Request id for request-scoped events; `None` for memory results.
    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            MemoryEvent::ResourcesResponse(p)
            | MemoryEvent::BuildRequest(p)
            | MemoryEvent::BuildResponse(p) => Some(&p.request_id),
            MemoryEvent::MemoryResult(_) => None,
        }
    }
}
