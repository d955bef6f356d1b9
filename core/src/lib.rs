//! # Resource Slice Core
//!
//! Core types for the resource slice state container.
//!
//! This crate provides the pure, I/O-free half of the abstraction: the
//! [`ResourceState`] value that every slice owns, the [`RequestToken`] used
//! to discard superseded completions, and the [`TriggerError`] surfaced to
//! trigger callers. The executing half (spawning operations, committing
//! settlements, notifying subscribers) lives in `resource-slice-runtime`.
//!
//! ## Core Concepts
//!
//! - **State**: `{status, result, error}` for exactly one asynchronous
//!   resource, always in exactly one of `idle`, `loading`, `success`,
//!   `error`
//! - **Transition**: in-place mutation through a small set of methods that
//!   preserve the state invariants (`begin_loading`, `commit_success`,
//!   `commit_error`, `reset`)
//! - **Token**: a monotonically increasing counter; a settlement carrying a
//!   stale token must not be committed
//!
//! ## Example
//!
//! ```
//! use resource_slice_core::{ResourceState, ResourceStatus};
//!
//! let mut state: ResourceState<Vec<String>, String> = ResourceState::idle();
//! state.begin_loading();
//! assert_eq!(state.status(), ResourceStatus::Loading);
//!
//! state.commit_success(vec!["Acme".to_string()]);
//! assert_eq!(state.status(), ResourceStatus::Success);
//! assert!(state.error().is_none());
//! ```

// Re-export commonly used types
pub use serde::{Deserialize, Serialize};

/// Error types surfaced to trigger callers
pub mod error;

/// Type aliases for injected operations
pub mod operation;

/// Resource state and its transitions
pub mod state;

/// Request tokens for supersession detection
pub mod token;

pub use error::{TriggerError, display_error};
pub use operation::OperationFuture;
pub use state::{ResourceState, ResourceStatus};
pub use token::RequestToken;
