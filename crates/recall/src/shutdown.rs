// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! SIGTERM and SIGINT (Ctrl+C) cancel a [`CancellationToken`] that the
//! service loop monitors. Outstanding background computations are drained
//! before the process exits.

use std::time::Duration;

use recall_memory::MemoryOrchestrator;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is received.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = sigterm.recv() => {
                            info!("received SIGTERM, initiating shutdown");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Waits up to `timeout` for outstanding non-blocking computations.
///
/// Returns `false` if the timeout elapsed first.
pub async fn drain_background(orchestrator: &MemoryOrchestrator, timeout: Duration) -> bool {
    let outstanding = orchestrator.stats().background_tasks;
    if outstanding == 0 {
        debug!("no background computations to drain");
        return true;
    }

    info!(count = outstanding, "waiting for background computations to complete");
    match tokio::time::timeout(timeout, orchestrator.drain_background()).await {
        Ok(()) => {
            info!("background computations drained");
            true
        }
        Err(_) => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "background drain timed out, abandoning remaining computations"
            );
            false
        }
    }
}
