//! Fetch state and generation-token slots.
//!
//! Every independently fetched piece of view state lives in a [`Slot`]. A
//! slot remembers which request generation is authoritative; a completion
//! tagged with any other generation is dropped on arrival.

use std::fmt;

use tracing::debug;

use crate::api::ApiRequest;

/// Lifecycle of one slot's data.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Monotonic request counter for a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

/// One independently managed unit of view state.
///
/// `R` is whatever the slot's request is derived from; usually the
/// [`ApiRequest`] itself, but a slot fed by several requests can key on the
/// shared input instead.
#[derive(Debug, Clone)]
pub struct Slot<T, R = ApiRequest> {
    name: &'static str,
    state: FetchState<T>,
    generation: Generation,
    last_issued: Option<R>,
}

impl<T, R: PartialEq + fmt::Debug> Slot<T, R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: FetchState::Idle,
            generation: Generation::default(),
            last_issued: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn last_issued(&self) -> Option<&R> {
        self.last_issued.as_ref()
    }

    /// Whether `request` differs from the last request issued for this slot.
    pub fn needs(&self, request: &R) -> bool {
        self.last_issued.as_ref() != Some(request)
    }

    /// Start a new request, superseding anything in flight.
    pub fn begin(&mut self, request: R) -> Generation {
        self.generation = self.generation.next();
        self.state = FetchState::Loading;
        debug!(
            "{}: issuing {:?} (generation {})",
            self.name,
            request,
            self.generation.value()
        );
        self.last_issued = Some(request);
        self.generation
    }

    /// Whether a completion tagged `generation` would still be applied.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation && self.state.is_loading()
    }

    /// Like [`Slot::is_current`], logging the completion it rejects.
    pub fn accepts(&self, generation: Generation) -> bool {
        let current = self.is_current(generation);
        if !current {
            debug!(
                "{}: dropping stale completion (generation {}, current {})",
                self.name,
                generation.value(),
                self.generation.value()
            );
        }
        current
    }

    /// Apply a completion. Returns false, leaving state untouched, if the
    /// completion belongs to a superseded request.
    pub fn resolve(&mut self, generation: Generation, result: Result<T, String>) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.state = match result {
            Ok(value) => FetchState::Loaded(value),
            Err(reason) => FetchState::Failed(reason),
        };
        true
    }

    /// Return to Idle, invalidating any request in flight.
    pub fn reset(&mut self) {
        self.generation = self.generation.next();
        self.state = FetchState::Idle;
        self.last_issued = None;
    }
}

/// An issued request waiting to be executed, tagged with its slot and generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket<K> {
    pub slot: K,
    pub generation: Generation,
    pub request: ApiRequest,
}
