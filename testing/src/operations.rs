//! Operations with test-controlled settlement.

use resource_slice_core::OperationFuture;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

struct PendingCall<P, T, E> {
    params: P,
    responder: Option<oneshot::Sender<Result<T, E>>>,
}

/// An operation whose calls stay in flight until the test settles them.
///
/// Each invocation registers a pending call (synchronously, during the
/// trigger's own call) and returns a future that resolves only when the
/// test settles that call by index. Calls may be settled in any order,
/// which is exactly what supersession-race tests need.
///
/// A call whose gate is dropped without being settled never resolves.
pub struct GatedOperation<P, T, E> {
    calls: Arc<Mutex<Vec<PendingCall<P, T, E>>>>,
}

impl<P, T, E> GatedOperation<P, T, E>
where
    P: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a gate with no recorded calls
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The operation closure to hand to a slice
    #[must_use]
    pub fn operation(&self) -> impl Fn(P) -> OperationFuture<T, E> + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);

        move |params: P| {
            let (responder, settled) = oneshot::channel();
            {
                let mut registry = calls.lock().unwrap_or_else(PoisonError::into_inner);
                registry.push(PendingCall {
                    params,
                    responder: Some(responder),
                });
            }

            Box::pin(async move {
                match settled.await {
                    Ok(outcome) => outcome,
                    // Gate dropped without settling: stay in flight forever
                    Err(_) => std::future::pending().await,
                }
            })
        }
    }

    /// Total number of calls made so far (settled or not)
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of calls still awaiting settlement
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.responder.is_some())
            .count()
    }

    /// Settle the `index`-th call (in call order) with the given outcome.
    ///
    /// Returns `false` if no such call exists or it was already settled.
    /// Settlement is accepted even when the caller's future has been
    /// dropped.
    pub fn settle(&self, index: usize, outcome: Result<T, E>) -> bool {
        let mut registry = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        match registry.get_mut(index).and_then(|c| c.responder.take()) {
            Some(responder) => {
                let _ = responder.send(outcome);
                true
            },
            None => false,
        }
    }

    /// Settle the oldest still-pending call
    pub fn settle_next(&self, outcome: Result<T, E>) -> bool {
        let mut registry = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        match registry.iter_mut().find_map(|c| c.responder.take()) {
            Some(responder) => {
                let _ = responder.send(outcome);
                true
            },
            None => false,
        }
    }

    /// Parameters the `index`-th call was made with
    #[must_use]
    pub fn params(&self, index: usize) -> Option<P>
    where
        P: Clone,
    {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .map(|call| call.params.clone())
    }
}

impl<P, T, E> Default for GatedOperation<P, T, E>
where
    P: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, T, E> Clone for GatedOperation<P, T, E> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

/// An operation that replays a queue of pre-arranged outcomes.
///
/// Each call pops the front outcome; a call made against an empty script
/// never resolves. Parameters are ignored.
pub struct ScriptedOperation<T, E> {
    outcomes: Arc<Mutex<VecDeque<Result<T, E>>>>,
}

impl<T, E> ScriptedOperation<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create an empty script
    #[must_use]
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a script from outcomes in call order
    #[must_use]
    pub fn with_outcomes(outcomes: impl IntoIterator<Item = Result<T, E>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into_iter().collect())),
        }
    }

    /// Append an outcome to the script
    pub fn push(&self, outcome: Result<T, E>) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Outcomes not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The operation closure to hand to a slice
    #[must_use]
    pub fn operation<P>(&self) -> impl Fn(P) -> OperationFuture<T, E> + Send + Sync + 'static
    where
        P: Send + 'static,
    {
        let outcomes = Arc::clone(&self.outcomes);

        move |_params: P| {
            let next = outcomes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();

            Box::pin(async move {
                match next {
                    Some(outcome) => outcome,
                    // Script exhausted: stay in flight forever
                    None => std::future::pending().await,
                }
            })
        }
    }
}

impl<T, E> Default for ScriptedOperation<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for ScriptedOperation<T, E> {
    fn clone(&self) -> Self {
        Self {
            outcomes: Arc::clone(&self.outcomes),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests may unwrap on failure
mod tests {
    use super::*;

    #[tokio::test]
    async fn gated_calls_settle_out_of_order() {
        let gate: GatedOperation<u32, u32, String> = GatedOperation::new();
        let operation = gate.operation();

        let first = operation(1);
        let second = operation(2);
        assert_eq!(gate.call_count(), 2);
        assert_eq!(gate.params(0), Some(1));
        assert_eq!(gate.params(1), Some(2));

        assert!(gate.settle(1, Ok(20)));
        assert_eq!(second.await, Ok(20));
        assert_eq!(gate.pending_count(), 1);

        assert!(gate.settle(0, Err("late failure".to_string())));
        assert_eq!(first.await, Err("late failure".to_string()));

        // Double settlement is rejected
        assert!(!gate.settle(0, Ok(0)));
    }

    #[tokio::test]
    async fn settle_next_picks_oldest_pending() {
        let gate: GatedOperation<(), u32, String> = GatedOperation::new();
        let operation = gate.operation();

        let first = operation(());
        let second = operation(());

        assert!(gate.settle_next(Ok(1)));
        assert!(gate.settle_next(Ok(2)));
        assert_eq!(first.await, Ok(1));
        assert_eq!(second.await, Ok(2));
        assert!(!gate.settle_next(Ok(3)));
    }

    #[tokio::test]
    async fn scripted_outcomes_replay_in_order() {
        let script: ScriptedOperation<u32, String> =
            ScriptedOperation::with_outcomes([Ok(1), Err("boom".to_string())]);
        let operation = script.operation::<()>();

        assert_eq!(operation(()).await, Ok(1));
        assert_eq!(operation(()).await, Err("boom".to_string()));
        assert_eq!(script.remaining(), 0);
    }
}
