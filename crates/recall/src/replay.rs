// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall replay`: feeds recorded upstream requests through the service loop.
//!
//! Input is newline-delimited JSON, one resources payload per line. Each
//! final response is written to stdout as one JSON line, in completion order.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use recall_bus::{EventBus, ResourcesPayload};
use recall_config::RecallConfig;
use recall_core::RecallError;
use recall_memory::{registry_from_config, MemoryOrchestrator, OrchestratorOptions, SharedState};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::shutdown;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Parses newline-delimited payloads, skipping blank lines.
pub fn parse_requests(input: &str) -> Result<Vec<ResourcesPayload>, RecallError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                RecallError::Internal(format!("line {}: invalid resources payload: {e}", index + 1))
            })
        })
        .collect()
}

/// Builds an orchestrator from configuration.
pub fn build_orchestrator(config: &RecallConfig) -> Result<MemoryOrchestrator, RecallError> {
    let registry = registry_from_config(&config.providers)?;
    Ok(MemoryOrchestrator::new(
        registry,
        SharedState::default(),
        EventBus::new(config.orchestrator.event_capacity),
        OrchestratorOptions::from(&config.orchestrator),
    ))
}

pub async fn run(config: &RecallConfig, input: &Path) -> Result<(), RecallError> {
    let contents = tokio::fs::read_to_string(input).await.map_err(|e| {
        RecallError::Internal(format!("failed to read {}: {e}", input.display()))
    })?;
    let requests = parse_requests(&contents)?;
    info!(path = %input.display(), requests = requests.len(), "replaying requests");

    let orchestrator = build_orchestrator(config)?;
    let cancel = shutdown::install_signal_handler();
    let queue = config.orchestrator.request_queue;
    let (in_tx, in_rx) = mpsc::channel(queue);
    let (out_tx, mut out_rx) = mpsc::channel::<ResourcesPayload>(queue);

    let writer = tokio::spawn(async move {
        let mut written = 0usize;
        let stdout = std::io::stdout();
        while let Some(response) = out_rx.recv().await {
            let line = serde_json::to_string(&response).map_err(|e| {
                RecallError::Internal(format!("failed to encode response: {e}"))
            })?;
            let mut lock = stdout.lock();
            writeln!(lock, "{line}")
                .map_err(|e| RecallError::Internal(format!("failed to write response: {e}")))?;
            written += 1;
        }
        Ok::<usize, RecallError>(written)
    });

    let feeder = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            for request in requests {
                if cancel.is_cancelled() || in_tx.send(request).await.is_err() {
                    break;
                }
            }
            debug!("all requests queued");
        }
    });

    let served = orchestrator.serve(in_rx, out_tx, cancel).await;
    feeder.abort();
    shutdown::drain_background(&orchestrator, DRAIN_TIMEOUT).await;

    let written = writer
        .await
        .map_err(|e| RecallError::Internal(format!("response writer failed: {e}")))??;
    served?;

    let stats = orchestrator.stats();
    info!(
        responses = written,
        processed = stats.processed_requests,
        cached_builds = stats.cached_builds,
        stored_results = stats.stored_results,
        "replay complete"
    );
    Ok(())
}
