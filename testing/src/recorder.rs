//! Committed-state capture for notification assertions.

use resource_slice_core::{ResourceState, ResourceStatus};
use std::sync::{Arc, Mutex, PoisonError};

/// A listener that records every committed snapshot it is notified with.
///
/// Register it on a slice via [`StateRecorder::listener`], then assert on
/// [`StateRecorder::statuses`]: one entry per committed transition, none
/// for discarded stale settlements.
pub struct StateRecorder<T, E> {
    states: Arc<Mutex<Vec<ResourceState<T, E>>>>,
}

impl<T, E> StateRecorder<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The listener closure to register with a slice
    #[must_use]
    pub fn listener(&self) -> impl Fn(&ResourceState<T, E>) + Send + Sync + 'static {
        let states = Arc::clone(&self.states);
        move |snapshot: &ResourceState<T, E>| {
            states
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(snapshot.clone());
        }
    }

    /// All recorded snapshots, in notification order
    #[must_use]
    pub fn states(&self) -> Vec<ResourceState<T, E>> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The status of each recorded snapshot, in notification order
    #[must_use]
    pub fn statuses(&self) -> Vec<ResourceStatus> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(ResourceState::status)
            .collect()
    }

    /// Number of notifications recorded
    #[must_use]
    pub fn len(&self) -> usize {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no notification was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<T, E> Default for StateRecorder<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for StateRecorder<T, E> {
    fn clone(&self) -> Self {
        Self {
            states: Arc::clone(&self.states),
        }
    }
}
