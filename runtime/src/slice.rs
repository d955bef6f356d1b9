//! The resource slice: one resource's request/response lifecycle.
//!
//! A slice owns an isolated unit of mutable state plus one asynchronous
//! operation bound to it. All mutation goes through [`ResourceSlice::trigger`]
//! and [`ResourceSlice::reset`]; reads go through [`ResourceSlice::get_state`],
//! [`ResourceSlice::read`], [`ResourceSlice::subscribe`], and
//! [`ResourceSlice::watch`].
//!
//! # Race resolution
//!
//! Token comparison, not future identity, decides whether a settlement is
//! current. Every trigger (and reset) bumps an atomic token; a settlement
//! re-checks the token *inside* the state lock and commits only if it still
//! holds the current one. A fast reset/re-trigger sequence therefore can
//! never be overwritten by an old response, even when the old response
//! arrives after the new one.

use crate::config::SliceConfig;
use crate::subscription::Subscription;
use resource_slice_core::{OperationFuture, RequestToken, ResourceState, TriggerError};
use std::collections::VecDeque;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{oneshot, watch};

type BoxedOperation<P, T, E> = Arc<dyn Fn(P) -> OperationFuture<T, E> + Send + Sync>;
type SharedListener<T, E> = Arc<dyn Fn(&ResourceState<T, E>) + Send + Sync>;

/// State shared between the slice handle and its spawned attempts.
struct SliceShared<T, E> {
    state: Mutex<ResourceState<T, E>>,
    /// Current request token as a raw sequence number. Bumped by every
    /// trigger and reset; settlements compare against it under the state
    /// lock.
    token: AtomicU64,
    listeners: Mutex<Vec<(u64, SharedListener<T, E>)>>,
    next_listener_id: AtomicU64,
    watch_tx: watch::Sender<ResourceState<T, E>>,
    /// Committed snapshots awaiting listener delivery. Snapshots are
    /// enqueued under the state lock, so queue order is commit order.
    pending: Mutex<VecDeque<ResourceState<T, E>>>,
    /// Whether a thread is currently draining `pending`.
    dispatching: AtomicBool,
    on_supersede: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl<T, E> SliceShared<T, E>
where
    T: Clone,
    E: Clone,
{
    fn lock_state(&self) -> MutexGuard<'_, ResourceState<T, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_token(&self) -> RequestToken {
        RequestToken::new(self.token.load(Ordering::SeqCst))
    }

    /// Record a committed snapshot for delivery.
    ///
    /// Must be called with the state lock held: the watch channel and the
    /// pending queue then observe transitions in commit order, even when
    /// settlements and resets race across threads.
    fn enqueue_locked(&self, snapshot: ResourceState<T, E>) {
        let _ = self.watch_tx.send(snapshot.clone());
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(snapshot);
    }

    /// Deliver queued snapshots to listeners, in commit order.
    ///
    /// At most one thread drains the queue at a time; a committer that
    /// finds a drain in progress leaves its snapshot for the active
    /// dispatcher. Listeners run without any slice lock held, so a
    /// listener may re-enter the slice (read state, even trigger or
    /// reset): the nested commit enqueues and returns, and the outer
    /// drain delivers it next.
    fn dispatch(&self) {
        loop {
            if self.dispatching.swap(true, Ordering::SeqCst) {
                return;
            }

            loop {
                let next = self
                    .pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                let Some(snapshot) = next else { break };

                let listeners: Vec<SharedListener<T, E>> = {
                    let registry = self
                        .listeners
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    registry.iter().map(|(_, l)| Arc::clone(l)).collect()
                };
                for listener in listeners {
                    listener(&snapshot);
                }
            }

            self.dispatching.store(false, Ordering::SeqCst);

            // A snapshot enqueued between the drain and the flag release
            // would otherwise sit undelivered
            let drained = self
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_empty();
            if drained {
                return;
            }
        }
    }

    /// Commit the `loading` transition for an attempt, unless a newer
    /// trigger already superseded it. Fires the abort hook when the
    /// attempt replaces one that was still in flight.
    fn begin_attempt(&self, token: RequestToken) -> bool {
        let superseded_in_flight = {
            let mut state = self.lock_state();
            if self.current_token() != token {
                return false;
            }
            let was_loading = state.status().is_loading();
            state.begin_loading();
            self.enqueue_locked(state.clone());
            was_loading
        };

        self.dispatch();

        if superseded_in_flight {
            if let Some(hook) = &self.on_supersede {
                hook();
            }
        }
        true
    }

    /// Commit a settlement if its token is still current. Returns whether
    /// the settlement was committed; a stale settlement leaves the store
    /// untouched.
    fn settle(&self, token: RequestToken, outcome: &Result<T, E>) -> bool {
        {
            let mut state = self.lock_state();
            if self.current_token() != token {
                return false;
            }
            match outcome {
                Ok(value) => state.commit_success(value.clone()),
                Err(error) => state.commit_error(error.clone()),
            }
            self.enqueue_locked(state.clone());
        }

        self.dispatch();
        true
    }

    /// Commit the `idle` transition. An already-idle slice is left
    /// untouched and subscribers are not re-notified. Fires the abort
    /// hook when an attempt was still in flight.
    fn reset_state(&self) {
        let was_loading = {
            let mut state = self.lock_state();
            if state.status().is_idle() {
                return;
            }
            let was_loading = state.status().is_loading();
            state.reset();
            self.enqueue_locked(state.clone());
            was_loading
        };

        self.dispatch();

        if was_loading {
            if let Some(hook) = &self.on_supersede {
                hook();
            }
        }
    }
}

/// A typed async-resource state container.
///
/// One slice wraps one injected asynchronous operation in a uniform
/// `idle → loading → success | error` state machine. Many independent
/// instances coexist in an application, one per resource type.
///
/// # Type Parameters
///
/// - `P`: Parameters passed to the operation on each trigger
/// - `T`: Payload produced by a fulfilled operation
/// - `E`: Normalized error stored after a rejected operation
///
/// # Example
///
/// ```ignore
/// let territories = ResourceSlice::with_normalizer(
///     move |query: TerritoryQuery| api.list_territories(query),
///     |err| err.to_string(),
/// );
///
/// let _sub = territories.subscribe(|state| render_table(state));
/// let rows = territories.trigger(TerritoryQuery::default()).await?;
/// ```
pub struct ResourceSlice<P, T, E> {
    shared: Arc<SliceShared<T, E>>,
    operation: BoxedOperation<P, T, E>,
}

impl<P, T, E> ResourceSlice<P, T, E>
where
    P: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a slice whose operation error converts into `E` via [`Into`].
    ///
    /// # Arguments
    ///
    /// - `operation`: The injected asynchronous operation whose lifecycle
    ///   this slice tracks. The slice never validates the parameters it
    ///   forwards.
    #[must_use]
    pub fn new<Op, Fut, Raw>(operation: Op) -> Self
    where
        Op: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Raw>> + Send + 'static,
        Raw: Into<E> + Send + 'static,
    {
        Self::with_normalizer(operation, Raw::into)
    }

    /// Create a slice with an explicit error normalizer.
    ///
    /// The raw rejection type is erased here: only normalized `E` values
    /// ever reach the committed state or a trigger caller. For plain
    /// string errors, [`display_error`](resource_slice_core::display_error)
    /// is the conventional normalizer.
    #[must_use]
    pub fn with_normalizer<Op, Fut, Raw, N>(operation: Op, normalize: N) -> Self
    where
        Op: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Raw>> + Send + 'static,
        Raw: Send + 'static,
        N: Fn(Raw) -> E + Send + Sync + 'static,
    {
        Self::with_config(operation, normalize, SliceConfig::new())
    }

    /// Create a slice with an explicit normalizer and configuration.
    #[must_use]
    pub fn with_config<Op, Fut, Raw, N>(operation: Op, normalize: N, config: SliceConfig) -> Self
    where
        Op: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Raw>> + Send + 'static,
        Raw: Send + 'static,
        N: Fn(Raw) -> E + Send + Sync + 'static,
    {
        let normalize = Arc::new(normalize);
        let operation: BoxedOperation<P, T, E> = Arc::new(move |params: P| {
            let future = operation(params);
            let normalize = Arc::clone(&normalize);
            Box::pin(async move { future.await.map_err(|raw| normalize(raw)) })
        });

        let (watch_tx, _) = watch::channel(ResourceState::idle());

        Self {
            shared: Arc::new(SliceShared {
                state: Mutex::new(ResourceState::idle()),
                token: AtomicU64::new(RequestToken::ZERO.value()),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                watch_tx,
                pending: Mutex::new(VecDeque::new()),
                dispatching: AtomicBool::new(false),
                on_supersede: config.on_supersede,
            }),
            operation,
        }
    }

    /// Synchronous snapshot of the current committed state
    #[must_use]
    pub fn get_state(&self) -> ResourceState<T, E> {
        self.shared.lock_state().clone()
    }

    /// Read committed state through a closure, without cloning the payload
    ///
    /// ```ignore
    /// let row_count = slice.read(|s| s.result().map_or(0, Vec::len));
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ResourceState<T, E>) -> R,
    {
        f(&self.shared.lock_state())
    }

    /// Start a new attempt of the injected operation.
    ///
    /// Token allocation and the `loading` transition (previous result
    /// retained, previous error cleared) are committed synchronously
    /// before this method returns; subscribers observe every committed
    /// transition in commit order. The operation itself runs on a spawned
    /// task, so its settlement is committed or discarded even if the
    /// returned future is dropped.
    ///
    /// The returned future always yields this attempt's own outcome,
    /// whether or not the attempt was superseded before settling.
    ///
    /// # Errors
    ///
    /// The returned future resolves to [`TriggerError::Operation`] when the
    /// operation rejects (the same normalized error is committed to state
    /// if this attempt was still current), or [`TriggerError::TaskFailed`]
    /// when the operation panicked while constructing its future or the
    /// attempt's task died before settling. A dead attempt leaves the
    /// slice in `loading` until a newer trigger or reset supersedes it;
    /// committed state is never corrupted.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since the attempt is
    /// spawned as a task.
    pub fn trigger(&self, params: P) -> impl Future<Output = Result<T, TriggerError<E>>> + Send {
        let token = RequestToken::new(self.shared.token.fetch_add(1, Ordering::SeqCst) + 1);
        metrics::counter!("slice.triggers.total").increment(1);
        tracing::debug!(token = %token, "Starting trigger attempt");

        if !self.shared.begin_attempt(token) {
            // A concurrent trigger superseded this attempt before its
            // loading transition could commit. The attempt still runs for
            // its own caller.
            tracing::trace!(token = %token, "Loading transition skipped, attempt already superseded");
        }

        // The operation closure runs on the caller's thread; contain a
        // panic during future construction so it settles this caller as
        // `TaskFailed` instead of unwinding through `trigger`
        let operation_future = catch_unwind(AssertUnwindSafe(|| (self.operation)(params))).ok();
        if operation_future.is_none() {
            tracing::warn!(token = %token, "Operation panicked while constructing its future");
            metrics::counter!("slice.operation.panics.total").increment(1);
        }

        let shared = Arc::clone(&self.shared);
        let (done_tx, done_rx) = oneshot::channel();

        // On the panic path nothing takes `done_tx`; dropping it resolves
        // the caller's future with `TaskFailed`
        if let Some(operation_future) = operation_future {
            tokio::spawn(async move {
                let started = std::time::Instant::now();
                let outcome = operation_future.await;
                metrics::histogram!("slice.operation.duration_seconds")
                    .record(started.elapsed().as_secs_f64());

                if shared.settle(token, &outcome) {
                    match &outcome {
                        Ok(_) => {
                            tracing::debug!(token = %token, "Committed success");
                            metrics::counter!("slice.commits.total", "outcome" => "success")
                                .increment(1);
                        },
                        Err(_) => {
                            tracing::debug!(token = %token, "Committed error");
                            metrics::counter!("slice.commits.total", "outcome" => "error")
                                .increment(1);
                        },
                    }
                } else {
                    tracing::debug!(token = %token, "Discarded stale settlement");
                    metrics::counter!("slice.settlements.discarded.total").increment(1);
                }

                // The caller's own future settles regardless of token freshness
                let _ = done_tx.send(outcome);
            });
        }

        async move {
            match done_rx.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(error)) => Err(TriggerError::Operation(error)),
                Err(_) => Err(TriggerError::TaskFailed),
            }
        }
    }

    /// Return the slice to `{idle, no result, no error}` immediately.
    ///
    /// Does not cancel an in-flight operation, but bumps the token so its
    /// eventual settlement is discarded; the abort hook (if configured)
    /// fires when an attempt was in flight. The original caller's future
    /// still settles with its own outcome. Resetting an already-idle slice
    /// is a no-op and does not re-notify subscribers.
    pub fn reset(&self) {
        let token = RequestToken::new(self.shared.token.fetch_add(1, Ordering::SeqCst) + 1);
        metrics::counter!("slice.resets.total").increment(1);
        tracing::debug!(token = %token, "Resetting slice");

        self.shared.reset_state();
    }

    /// Register a listener invoked after every committed transition, in
    /// commit order (never for discarded stale settlements).
    ///
    /// The listener receives the committed snapshot and runs without any
    /// slice lock held, so it may re-enter the slice. Dropping the returned
    /// [`Subscription`] unsubscribes.
    #[must_use]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ResourceState<T, E>) + Send + Sync + 'static,
    {
        let id = self.shared.next_listener_id.fetch_add(1, Ordering::SeqCst);
        {
            let mut registry = self
                .shared
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            registry.push((id, Arc::new(listener)));
        }

        let weak = Arc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = weak.upgrade() {
                let mut registry = shared
                    .listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                registry.retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Observe committed states through a watch channel.
    ///
    /// For consumers that prefer awaiting changes to registering a
    /// callback. The receiver holds the latest committed snapshot; like any
    /// watch channel it coalesces bursts, so use [`subscribe`] when every
    /// individual transition matters.
    ///
    /// [`subscribe`]: ResourceSlice::subscribe
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<ResourceState<T, E>> {
        self.shared.watch_tx.subscribe()
    }
}

impl<P, T, E> Clone for ResourceSlice<P, T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            operation: Arc::clone(&self.operation),
        }
    }
}

impl<P, T, E> std::fmt::Debug for ResourceSlice<P, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSlice")
            .field("token", &self.shared.current_token_raw())
            .finish_non_exhaustive()
    }
}

impl<T, E> SliceShared<T, E> {
    fn current_token_raw(&self) -> u64 {
        self.token.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests may unwrap on failure
mod tests {
    use super::*;
    use resource_slice_core::ResourceStatus;

    fn doubling_slice() -> ResourceSlice<u32, u32, String> {
        ResourceSlice::new(|x: u32| async move { Ok::<_, String>(x * 2) })
    }

    #[tokio::test]
    async fn new_slice_starts_idle() {
        let slice = doubling_slice();
        let state = slice.get_state();
        assert_eq!(state.status(), ResourceStatus::Idle);
        assert!(state.result().is_none());
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn trigger_commits_success_and_returns_value() {
        let slice = doubling_slice();

        let value = slice.trigger(21).await.unwrap();
        assert_eq!(value, 42);

        let state = slice.get_state();
        assert_eq!(state.status(), ResourceStatus::Success);
        assert_eq!(state.result(), Some(&42));
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn normalizer_shapes_the_stored_error() {
        let slice: ResourceSlice<(), u32, String> = ResourceSlice::with_normalizer(
            |(): ()| async move { Err::<u32, _>(7u16) },
            |code| format!("upstream code {code}"),
        );

        let error = slice.trigger(()).await.unwrap_err();
        assert_eq!(error.into_operation().as_deref(), Some("upstream code 7"));
        assert_eq!(
            slice.get_state().error().map(String::as_str),
            Some("upstream code 7")
        );
    }

    #[tokio::test]
    async fn read_borrows_without_cloning_payload() {
        let slice = doubling_slice();
        slice.trigger(5).await.unwrap();

        let doubled = slice.read(|s| s.result().copied());
        assert_eq!(doubled, Some(10));
    }

    #[tokio::test]
    async fn watch_sees_committed_states() {
        let slice = doubling_slice();
        let mut rx = slice.watch();

        slice.trigger(3).await.unwrap();

        rx.changed().await.unwrap();
        let latest = rx.borrow_and_update().clone();
        assert_eq!(latest.status(), ResourceStatus::Success);
        assert_eq!(latest.result(), Some(&6));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let slice = doubling_slice();
        let alias = slice.clone();

        slice.trigger(2).await.unwrap();
        assert_eq!(alias.get_state().result(), Some(&4));

        alias.reset();
        assert!(slice.get_state().status().is_idle());
    }
}
