//! Request tokens: monotonically increasing identifiers for trigger attempts.
//!
//! Every trigger allocates a fresh token before its operation starts. When a
//! settlement arrives, its token is compared against the slice's current
//! token: only a current settlement may commit. Supersession is therefore
//! decided by token comparison, never by completion order.

use serde::{Deserialize, Serialize};

/// Opaque identifier for one trigger attempt.
///
/// Tokens are allocated monotonically by the owning slice. A token is
/// "current" while no newer trigger or reset has occurred; an in-flight
/// operation holding a stale token must not mutate committed state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RequestToken(u64);

impl RequestToken {
    /// The token held by a slice before any trigger has occurred
    pub const ZERO: Self = Self(0);

    /// Create a token from a raw sequence number
    #[must_use]
    pub const fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    /// The raw sequence number
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The token that would supersede this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Check whether this token supersedes `other`
    #[must_use]
    pub const fn supersedes(self, other: Self) -> bool {
        self.0 > other.0
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
