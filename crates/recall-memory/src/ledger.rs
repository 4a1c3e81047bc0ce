// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request id bookkeeping for duplicate suppression.
//!
//! An id is admitted once, stays in-flight while its build runs and becomes
//! processed when its response is forwarded. Processed ids are kept for the
//! life of the process.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use recall_core::RequestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestState {
    InFlight,
    Processed,
}

/// Outcome of presenting a request id at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting; the caller owns the build.
    Admitted,
    /// Another delivery of this id is still being built.
    InFlight,
    /// A response for this id was already forwarded.
    Processed,
}

/// Tracks in-flight and processed request ids.
#[derive(Debug, Default)]
pub struct RequestLedger {
    states: DashMap<RequestId, RequestState>,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits `id` unless it is already in flight or processed.
    pub fn begin(&self, id: &RequestId) -> Admission {
        match self.states.entry(id.clone()) {
            Entry::Occupied(entry) => match entry.get() {
                RequestState::InFlight => Admission::InFlight,
                RequestState::Processed => Admission::Processed,
            },
            Entry::Vacant(entry) => {
                entry.insert(RequestState::InFlight);
                Admission::Admitted
            }
        }
    }

    /// Marks `id` processed. Returns `true` only for the call that made the
    /// transition, so at most one caller forwards a response per id.
    pub fn complete(&self, id: &RequestId) -> bool {
        match self.states.insert(id.clone(), RequestState::Processed) {
            Some(RequestState::Processed) => false,
            Some(RequestState::InFlight) | None => true,
        }
    }

    /// Forgets an in-flight id so a later delivery can retry it.
    /// Processed ids are left alone.
    pub fn release(&self, id: &RequestId) {
        self.states
            .remove_if(id, |_, state| *state == RequestState::InFlight);
    }

    pub fn is_processed(&self, id: &RequestId) -> bool {
        self.states
            .get(id)
            .is_some_and(|s| *s == RequestState::Processed)
    }

    pub fn is_in_flight(&self, id: &RequestId) -> bool {
        self.states
            .get(id)
            .is_some_and(|s| *s == RequestState::InFlight)
    }

    pub fn processed_count(&self) -> usize {
        self.count(RequestState::Processed)
    }

    pub fn in_flight_count(&self) -> usize {
        self.count(RequestState::InFlight)
    }

    fn count(&self, state: RequestState) -> usize {
        self.states.iter().filter(|e| *e.value() == state).count()
    }
}
