//! Error types surfaced to trigger callers.
//!
//! Operation failures never propagate to subscribers as unhandled errors:
//! they are captured into the slice's committed state, and the triggering
//! caller's own future is the only channel that sees the failure directly.

use thiserror::Error;

/// Failure of one trigger attempt, as seen by that attempt's caller.
///
/// The `E` parameter is the slice's normalized error type; the raw error
/// produced by the injected operation is normalized before it reaches
/// either the committed state or the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriggerError<E> {
    /// The injected operation rejected.
    ///
    /// If this attempt still held the current token when it settled, the
    /// same normalized error was committed into the slice's state.
    #[error("operation failed: {0}")]
    Operation(E),

    /// The attempt's task stopped before settling.
    ///
    /// This happens when the operation panics or the runtime is torn down
    /// mid-flight. Committed state is never corrupted by a dead attempt.
    #[error("operation task stopped before settling")]
    TaskFailed,
}

impl<E> TriggerError<E> {
    /// The normalized operation error, if this was an operation failure
    #[must_use]
    pub fn into_operation(self) -> Option<E> {
        match self {
            Self::Operation(error) => Some(error),
            Self::TaskFailed => None,
        }
    }

    /// Check if the attempt's task died before settling
    #[must_use]
    pub const fn is_task_failed(&self) -> bool {
        matches!(self, Self::TaskFailed)
    }
}

/// Default error normalizer: render the raw rejection as its display text.
///
/// Matches the conventional "message or stringified value" fallback used
/// when no structured error type is wanted.
///
/// # Example
///
/// ```
/// use resource_slice_core::display_error;
///
/// let raw = std::io::Error::other("network down");
/// assert_eq!(display_error(raw), "network down");
/// ```
pub fn display_error<Raw: std::fmt::Display>(raw: Raw) -> String {
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_error_displays_inner() {
        let error: TriggerError<String> = TriggerError::Operation("network down".to_string());
        assert_eq!(error.to_string(), "operation failed: network down");
        assert_eq!(error.into_operation().as_deref(), Some("network down"));
    }

    #[test]
    fn task_failed_carries_no_operation_error() {
        let error: TriggerError<String> = TriggerError::TaskFailed;
        assert!(error.is_task_failed());
        assert!(error.into_operation().is_none());
    }

    #[test]
    fn display_error_stringifies() {
        assert_eq!(display_error("plain"), "plain");
        assert_eq!(display_error(404), "404");
    }
}
