// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The memory build orchestrator.
//!
//! One upstream request flows through four stages:
//!
//! 1. **intake**: duplicate ids are dropped, new ids become a build-request
//! 2. **background fan-out**: every non-blocking provider is dispatched and
//!    never awaited; its result lands in the [`ResultStore`] when it is ready
//! 3. **build**: on a cache miss every blocking provider is awaited
//!    concurrently, then contributions are merged in registry order
//! 4. **forward**: the first build-response per id becomes the final
//!    resources-response; any later one is dropped
//!
//! Every stage publishes its event on the [`EventBus`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use futures::FutureExt;
use recall_bus::{EventBus, MemoryEvent, MemoryResult, ResourcesPayload};
use recall_config::model::OrchestratorConfig;
use recall_core::{Message, ProviderMode, RecallError};
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn, Instrument};

use crate::cache::BuildCache;
use crate::clock::MonotonicClock;
use crate::fingerprint::fingerprint;
use crate::ledger::{Admission, RequestLedger};
use crate::recording;
use crate::registry::{ProviderDescriptor, ProviderRegistry};
use crate::result_store::ResultStore;

/// Tunables for a [`MemoryOrchestrator`].
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Non-blocking computations allowed to be outstanding at once.
    pub max_background_tasks: usize,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            max_background_tasks: 64,
        }
    }
}

impl From<&OrchestratorConfig> for OrchestratorOptions {
    fn from(config: &OrchestratorConfig) -> Self {
        Self {
            max_background_tasks: config.max_background_tasks,
        }
    }
}

/// Process-wide mutable state, owned outside the orchestrator so hosts and
/// tests can share or inspect it.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    /// Latest memory-result per provider name.
    pub results: Arc<ResultStore>,
    /// Merged output per history fingerprint.
    pub cache: Arc<BuildCache>,
    /// In-flight and processed request ids.
    pub ledger: Arc<RequestLedger>,
}

/// Point-in-time counters for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorStats {
    /// Registered providers, blocking and non-blocking.
    pub providers: usize,
    /// Providers with a stored memory-result.
    pub stored_results: usize,
    /// Distinct history fingerprints in the build cache.
    pub cached_builds: usize,
    /// Request ids whose response has been forwarded.
    pub processed_requests: usize,
    /// Request ids admitted but not yet forwarded.
    pub in_flight_requests: usize,
    /// Non-blocking computations still running.
    pub background_tasks: usize,
}

struct Inner {
    registry: ProviderRegistry,
    state: SharedState,
    bus: EventBus,
    clock: MonotonicClock,
    background: TaskTracker,
    permits: Arc<Semaphore>,
}

/// Deduplicating fan-out/fan-in engine over a [`ProviderRegistry`].
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct MemoryOrchestrator {
    inner: Arc<Inner>,
}

impl MemoryOrchestrator {
    /// Creates an orchestrator over `registry`, sharing `state` and
    /// publishing every event on `bus`.
    pub fn new(
        registry: ProviderRegistry,
        state: SharedState,
        bus: EventBus,
        options: OrchestratorOptions,
    ) -> Self {
        info!(
            providers = registry.len(),
            blocking = registry.blocking().count(),
            non_blocking = registry.non_blocking().count(),
            max_background_tasks = options.max_background_tasks,
            "memory orchestrator initialized"
        );

        Self {
            inner: Arc::new(Inner {
                registry,
                state,
                bus,
                clock: MonotonicClock::new(),
                background: TaskTracker::new(),
                permits: Arc::new(Semaphore::new(options.max_background_tasks.max(1))),
            }),
        }
    }

    /// Runs one upstream request through intake, build and forward.
    ///
    /// Returns the final resources-response, or `None` when the request id
    /// was a duplicate or the build could not run.
    pub async fn handle(&self, payload: ResourcesPayload) -> Option<ResourcesPayload> {
        let request = self.intake(payload)?;
        let request_id = request.request_id.clone();

        match self.build(request).await {
            Ok(response) => self.forward(response),
            Err(e) => {
                error!(request_id = %request_id, error = %e, "memory build failed");
                self.inner.state.ledger.release(&request_id);
                None
            }
        }
    }

    /// Admits a new request id and publishes its build-request.
    ///
    /// Ids already in flight or processed are ignored and yield `None`.
    pub fn intake(&self, payload: ResourcesPayload) -> Option<ResourcesPayload> {
        match self.inner.state.ledger.begin(&payload.request_id) {
            Admission::Admitted => {
                recording::record_request();
                debug!(
                    request_id = %payload.request_id,
                    messages = payload.messages.len(),
                    "build request admitted"
                );
                self.inner
                    .bus
                    .publish(MemoryEvent::BuildRequest(payload.clone()));
                Some(payload)
            }
            admission => {
                recording::record_duplicate();
                debug!(
                    request_id = %payload.request_id,
                    ?admission,
                    "duplicate resources request ignored"
                );
                None
            }
        }
    }

    /// Builds the merged memory output for one build-request.
    ///
    /// Non-blocking providers are dispatched first and never awaited. A cache
    /// hit then returns the stored merge without calling any blocking
    /// provider. Otherwise every blocking provider runs concurrently and the
    /// response waits for all of them.
    ///
    /// Only a fingerprint failure is an error; provider failures shrink the
    /// output instead.
    pub async fn build(
        &self,
        mut request: ResourcesPayload,
    ) -> Result<ResourcesPayload, RecallError> {
        let started = Instant::now();
        let history = Arc::new(std::mem::take(&mut request.messages));
        let request_id = &request.request_id;

        self.dispatch_background(&history);

        let fingerprint = fingerprint(&history)?;
        let merged = match self.inner.state.cache.get(&fingerprint) {
            Some(cached) => {
                recording::record_cache_hit();
                debug!(request_id = %request_id, %fingerprint, "build cache hit");
                cached.as_ref().clone()
            }
            None => {
                let fresh = self.run_blocking(&history).await;
                let merged = self.merge(fresh);
                if self.inner.state.cache.insert(fingerprint, merged.clone()) {
                    debug!(request_id = %request_id, %fingerprint, "merged output cached");
                }
                merged
            }
        };

        let response = request.with_messages(merged);
        self.inner
            .bus
            .publish(MemoryEvent::BuildResponse(response.clone()));
        recording::record_build_latency(started.elapsed().as_secs_f64());
        Ok(response)
    }

    /// Forwards a build-response as the final resources-response.
    ///
    /// Only the first response for a request id is forwarded.
    pub fn forward(&self, response: ResourcesPayload) -> Option<ResourcesPayload> {
        if !self.inner.state.ledger.complete(&response.request_id) {
            debug!(
                request_id = %response.request_id,
                "build response for processed request dropped"
            );
            return None;
        }

        debug!(
            request_id = %response.request_id,
            messages = response.messages.len(),
            "resources response forwarded"
        );
        self.inner
            .bus
            .publish(MemoryEvent::ResourcesResponse(response.clone()));
        Some(response)
    }

    /// Applies a memory-result to the result store and publishes it.
    ///
    /// Returns `true` if the result became the stored value for its provider.
    pub fn store_result(&self, result: MemoryResult) -> bool {
        let applied = self.inner.state.results.apply(result.clone());
        if applied {
            debug!(
                provider = result.name.as_str(),
                timestamp = result.timestamp,
                messages = result.messages.len(),
                "memory result stored"
            );
        } else {
            debug!(
                provider = result.name.as_str(),
                timestamp = result.timestamp,
                "stale memory result ignored"
            );
        }
        self.inner.bus.publish(MemoryEvent::MemoryResult(result));
        applied
    }

    /// Consumes upstream requests until `cancel` fires or `inbound` closes.
    ///
    /// Each request is handled on its own task; final responses are sent to
    /// `outbound`. Returns after every accepted request has finished.
    pub async fn serve(
        &self,
        mut inbound: mpsc::Receiver<ResourcesPayload>,
        outbound: mpsc::Sender<ResourcesPayload>,
        cancel: CancellationToken,
    ) -> Result<(), RecallError> {
        info!("memory orchestrator serving");
        let requests = TaskTracker::new();

        let outcome = loop {
            if outbound.is_closed() {
                break Err(RecallError::ChannelClosed("outbound responses".to_string()));
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping memory orchestrator");
                    break Ok(());
                }
                msg = inbound.recv() => {
                    let Some(payload) = msg else {
                        debug!("inbound request queue closed");
                        break Ok(());
                    };
                    let this = self.clone();
                    let outbound = outbound.clone();
                    requests.spawn(async move {
                        if let Some(response) = this.handle(payload).await
                            && outbound.send(response).await.is_err()
                        {
                            warn!("outbound response queue closed, response dropped");
                        }
                    });
                }
            }
        };

        requests.close();
        requests.wait().await;
        info!("memory orchestrator stopped");
        outcome
    }

    /// Waits for every outstanding non-blocking computation to finish.
    ///
    /// The tracker is reopened even if this future is dropped mid-wait, so
    /// a timed-out drain leaves later dispatches tracked as usual.
    pub async fn drain_background(&self) {
        let tracker = &self.inner.background;
        tracker.close();
        let _reopen = ReopenOnDrop(tracker);
        tracker.wait().await;
    }

    /// Snapshot of the shared state and background activity.
    pub fn stats(&self) -> OrchestratorStats {
        let state = &self.inner.state;
        OrchestratorStats {
            providers: self.inner.registry.len(),
            stored_results: state.results.len(),
            cached_builds: state.cache.len(),
            processed_requests: state.ledger.processed_count(),
            in_flight_requests: state.ledger.in_flight_count(),
            background_tasks: self.inner.background.len(),
        }
    }

    /// The providers in merge order.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.inner.registry
    }

    /// Result store, build cache and request ledger.
    pub fn state(&self) -> &SharedState {
        &self.inner.state
    }

    /// The bus every pipeline event is published on.
    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    fn dispatch_background(&self, history: &Arc<Vec<Message>>) {
        for (_, descriptor) in self.inner.registry.non_blocking() {
            let Ok(permit) = Arc::clone(&self.inner.permits).try_acquire_owned() else {
                recording::record_background_skipped(descriptor.name());
                warn!(
                    provider = descriptor.name(),
                    "background pool saturated, non-blocking provider skipped this round"
                );
                continue;
            };

            let timestamp = self.inner.clock.now_millis();
            let descriptor = descriptor.clone();
            let history = Arc::clone(history);
            let this = self.clone();

            // Background work stays inside the dispatching request's span.
            let task = async move {
                let _permit = permit;
                match invoke(&descriptor, &history).await {
                    Ok(messages) => {
                        this.store_result(MemoryResult {
                            name: descriptor.name().to_string(),
                            messages,
                            timestamp,
                        });
                    }
                    Err(e) => {
                        recording::record_provider_failure(
                            descriptor.name(),
                            ProviderMode::NonBlocking,
                        );
                        warn!(
                            provider = descriptor.name(),
                            error = %e,
                            "non-blocking memory provider failed, previous result kept"
                        );
                    }
                }
            };
            self.inner.background.spawn(task.in_current_span());
        }
    }

    /// Awaits every blocking provider. The returned vec is indexed by
    /// registry position; failed and non-blocking positions are `None`.
    async fn run_blocking(&self, history: &[Message]) -> Vec<Option<Vec<Message>>> {
        let registry = &self.inner.registry;
        let blocking: Vec<(usize, &ProviderDescriptor)> = registry.blocking().collect();
        let timestamp = self.inner.clock.now_millis();

        let outcomes = join_all(
            blocking
                .iter()
                .map(|(_, descriptor)| invoke(descriptor, history)),
        )
        .await;

        let mut fresh = vec![None; registry.len()];
        for ((index, descriptor), outcome) in blocking.into_iter().zip(outcomes) {
            match outcome {
                Ok(messages) => {
                    self.store_result(MemoryResult {
                        name: descriptor.name().to_string(),
                        messages: messages.clone(),
                        timestamp,
                    });
                    fresh[index] = Some(messages);
                }
                Err(e) => {
                    recording::record_provider_failure(descriptor.name(), ProviderMode::Blocking);
                    error!(
                        provider = descriptor.name(),
                        error = %e,
                        "blocking memory provider failed, contributing nothing this round"
                    );
                }
            }
        }
        fresh
    }

    /// Concatenates contributions in registry order: fresh output for
    /// blocking providers, last stored result for non-blocking ones.
    fn merge(&self, mut fresh: Vec<Option<Vec<Message>>>) -> Vec<Message> {
        let mut merged = Vec::new();
        for (index, descriptor) in self.inner.registry.iter().enumerate() {
            let contribution = match descriptor.mode() {
                ProviderMode::Blocking => fresh.get_mut(index).and_then(Option::take),
                ProviderMode::NonBlocking => self.inner.state.results.latest(descriptor.name()),
            };
            merged.extend(contribution.unwrap_or_default());
        }
        merged
    }
}

impl std::fmt::Debug for MemoryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryOrchestrator")
            .field("registry", &self.inner.registry)
            .field("stats", &self.stats())
            .finish()
    }
}

struct ReopenOnDrop<'a>(&'a TaskTracker);

impl Drop for ReopenOnDrop<'_> {
    fn drop(&mut self) {
        self.0.reopen();
    }
}

/// Calls a provider, converting a panic into a compute error.
async fn invoke(
    descriptor: &ProviderDescriptor,
    history: &[Message],
) -> Result<Vec<Message>, RecallError> {
    match AssertUnwindSafe(descriptor.provider().compute(history))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(payload) => Err(RecallError::compute(
            descriptor.name(),
            format!("provider panicked: {}", panic_message(payload.as_ref())),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
