//! Resource state: the `{status, result, error}` value owned by a slice.
//!
//! A [`ResourceState`] tracks the lifecycle of exactly one asynchronous
//! operation. It is always in exactly one of four statuses, and it is only
//! mutated through the transition methods defined here:
//!
//! - [`ResourceState::begin_loading`]: `idle | success | error → loading`
//! - [`ResourceState::commit_success`]: `loading → success`
//! - [`ResourceState::commit_error`]: `loading → error`
//! - [`ResourceState::reset`]: `any → idle`
//!
//! The transitions maintain these invariants:
//!
//! - `idle` implies both `result` and `error` are `None`
//! - `error` is `None` outside the `error` status
//! - `result` survives a new `loading` transition (consumers may render
//!   stale data during a refetch) and is cleared only by `reset`

use serde::{Deserialize, Serialize};

/// Lifecycle status of an asynchronous resource.
///
/// Exactly one status holds at any time. `Loading` and `Error` are never
/// simultaneously observable, and `error` data is only present under
/// `Error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    /// No request has been made since creation or the last reset
    #[default]
    Idle,

    /// A request is in flight
    Loading,

    /// The most recent committed request fulfilled
    Success,

    /// The most recent committed request rejected
    Error,
}

impl ResourceStatus {
    /// Check if the status is `Idle`
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if the status is `Loading`
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if the status is `Success`
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Check if the status is `Error`
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// State of one asynchronous resource.
///
/// # Type Parameters
///
/// - `T`: The payload type produced by a fulfilled operation
/// - `E`: The normalized error type stored after a rejected operation
///
/// # Example
///
/// ```
/// use resource_slice_core::{ResourceState, ResourceStatus};
///
/// let mut state: ResourceState<u32, String> = ResourceState::idle();
///
/// state.begin_loading();
/// state.commit_success(7);
///
/// // A refetch keeps the previous result visible while loading
/// state.begin_loading();
/// assert_eq!(state.result(), Some(&7));
/// assert_eq!(state.status(), ResourceStatus::Loading);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState<T, E> {
    status: ResourceStatus,
    result: Option<T>,
    error: Option<E>,
}

impl<T, E> ResourceState<T, E> {
    /// Create a new state in `Idle` with no result and no error
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            status: ResourceStatus::Idle,
            result: None,
            error: None,
        }
    }

    /// Current status
    #[must_use]
    pub const fn status(&self) -> ResourceStatus {
        self.status
    }

    /// Most recently committed result, if any.
    ///
    /// Present under `Success`, and retained under a subsequent `Loading`
    /// so consumers may show stale data during a refetch.
    #[must_use]
    pub const fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Normalized error from the most recent committed rejection, if any.
    ///
    /// Always `None` outside the `Error` status.
    #[must_use]
    pub const fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    /// Consume the state, returning the result payload if present
    #[must_use]
    pub fn into_result(self) -> Option<T> {
        self.result
    }

    /// Transition into `Loading`.
    ///
    /// Clears any previous error. The previous result is retained until a
    /// new settlement commits or the state is reset.
    pub fn begin_loading(&mut self) {
        self.status = ResourceStatus::Loading;
        self.error = None;
    }

    /// Commit a fulfilled operation: `Success` with the given value
    pub fn commit_success(&mut self, value: T) {
        self.status = ResourceStatus::Success;
        self.result = Some(value);
        self.error = None;
    }

    /// Commit a rejected operation: `Error` with the normalized error.
    ///
    /// The previous result is left in place; the next `begin_loading`
    /// or `reset` decides its fate.
    pub fn commit_error(&mut self, error: E) {
        self.status = ResourceStatus::Error;
        self.error = Some(error);
    }

    /// Return to `Idle`, dropping both result and error
    pub fn reset(&mut self) {
        self.status = ResourceStatus::Idle;
        self.result = None;
        self.error = None;
    }
}

impl<T, E> Default for ResourceState<T, E> {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests may unwrap on failure
mod tests {
    use super::*;
    use proptest::prelude::*;

    type TestState = ResourceState<u32, String>;

    fn invariants_hold(state: &TestState) -> bool {
        let idle_clean = !state.status().is_idle()
            || (state.result().is_none() && state.error().is_none());
        let error_scoped = state.status().is_error() == state.error().is_some();
        idle_clean && error_scoped
    }

    #[test]
    fn new_state_is_idle_and_empty() {
        let state = TestState::idle();
        assert_eq!(state.status(), ResourceStatus::Idle);
        assert!(state.result().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn begin_loading_clears_error_keeps_result() {
        let mut state = TestState::idle();
        state.begin_loading();
        state.commit_success(1);
        state.begin_loading();
        state.commit_error("boom".to_string());

        state.begin_loading();
        assert_eq!(state.status(), ResourceStatus::Loading);
        assert_eq!(state.result(), Some(&1));
        assert!(state.error().is_none());
    }

    #[test]
    fn commit_success_replaces_result_and_clears_error() {
        let mut state = TestState::idle();
        state.begin_loading();
        state.commit_success(1);
        state.begin_loading();
        state.commit_success(2);

        assert_eq!(state.status(), ResourceStatus::Success);
        assert_eq!(state.result(), Some(&2));
        assert!(state.error().is_none());
    }

    #[test]
    fn commit_error_keeps_previous_result() {
        let mut state = TestState::idle();
        state.begin_loading();
        state.commit_success(9);
        state.begin_loading();
        state.commit_error("network down".to_string());

        assert_eq!(state.status(), ResourceStatus::Error);
        assert_eq!(state.result(), Some(&9));
        assert_eq!(state.error().map(String::as_str), Some("network down"));
    }

    #[test]
    fn reset_clears_everything_from_any_status() {
        let mut state = TestState::idle();
        state.begin_loading();
        state.commit_success(5);
        state.reset();

        assert_eq!(state.status(), ResourceStatus::Idle);
        assert!(state.result().is_none());
        assert!(state.error().is_none());

        state.begin_loading();
        state.reset();
        assert_eq!(state.status(), ResourceStatus::Idle);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ResourceStatus::Loading).unwrap();
        assert_eq!(json, "\"loading\"");
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut state = TestState::idle();
        state.begin_loading();
        state.commit_success(3);

        let json = serde_json::to_string(&state).unwrap();
        let back: TestState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[derive(Debug, Clone)]
    enum Transition {
        BeginLoading,
        CommitSuccess(u32),
        CommitError(String),
        Reset,
    }

    fn transition_strategy() -> impl Strategy<Value = Transition> {
        prop_oneof![
            Just(Transition::BeginLoading),
            any::<u32>().prop_map(Transition::CommitSuccess),
            "[a-z]{1,12}".prop_map(Transition::CommitError),
            Just(Transition::Reset),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_under_any_transition_sequence(
            transitions in proptest::collection::vec(transition_strategy(), 0..64)
        ) {
            let mut state = TestState::idle();
            prop_assert!(invariants_hold(&state));

            for transition in transitions {
                match transition {
                    Transition::BeginLoading => state.begin_loading(),
                    Transition::CommitSuccess(v) => state.commit_success(v),
                    Transition::CommitError(e) => state.commit_error(e),
                    Transition::Reset => state.reset(),
                }
                prop_assert!(invariants_hold(&state));
            }
        }
    }
}
