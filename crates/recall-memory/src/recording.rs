// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is a no-op.

use metrics::{describe_counter, describe_histogram};
use recall_core::ProviderMode;

/// Register all orchestrator metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("recall_requests_total", "Upstream requests admitted for a build");
    describe_counter!(
        "recall_duplicate_requests_total",
        "Upstream requests ignored because the id was in flight or processed"
    );
    describe_counter!("recall_cache_hits_total", "Builds answered from the build cache");
    describe_counter!(
        "recall_provider_failures_total",
        "Memory provider computations that failed or panicked"
    );
    describe_counter!(
        "recall_background_skipped_total",
        "Non-blocking dispatches skipped because the background pool was full"
    );
    describe_histogram!(
        "recall_build_latency_seconds",
        "Time from build start to build-response"
    );
}

pub(crate) fn record_request() {
    metrics::counter!("recall_requests_total").increment(1);
}

pub(crate) fn record_duplicate() {
    metrics::counter!("recall_duplicate_requests_total").increment(1);
}

pub(crate) fn record_cache_hit() {
    metrics::counter!("recall_cache_hits_total").increment(1);
}

pub(crate) fn record_provider_failure(provider: &str, mode: ProviderMode) {
    metrics::counter!(
        "recall_provider_failures_total",
        "provider" => provider.to_string(),
        "mode" => mode.to_string()
    )
    .increment(1);
}

pub(crate) fn record_background_skipped(provider: &str) {
    metrics::counter!("recall_background_skipped_total", "provider" => provider.to_string())
        .increment(1);
}

pub(crate) fn record_build_latency(seconds: f64) {
    metrics::histogram!("recall_build_latency_seconds").record(seconds);
}
