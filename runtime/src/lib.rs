//! # Resource Slice Runtime
//!
//! The executing half of the resource slice abstraction.
//!
//! A [`ResourceSlice`] owns one resource's request/response lifecycle: it
//! wraps a single injected asynchronous operation (typically a network
//! call) in a uniform `idle → loading → success | error` state machine with
//! race-free supersession and reset semantics. Applications instantiate one
//! slice per resource; dozens of independent instances coexist without any
//! shared state between them.
//!
//! ## Core Components
//!
//! - **`ResourceSlice`**: the factory-produced handle exposing `trigger`,
//!   `reset`, `get_state`, `subscribe`, and `watch`
//! - **Token guard**: every trigger allocates a fresh request token; only a
//!   settlement still holding the current token commits, so a late response
//!   from a superseded request can never overwrite newer state
//! - **Operation combinators**: opt-in retry and timeout wrappers applied
//!   to the injected operation, outside the slice's own contract
//!
//! ## Example
//!
//! ```ignore
//! use resource_slice_runtime::ResourceSlice;
//!
//! let slice: ResourceSlice<u64, Customer, String> =
//!     ResourceSlice::with_normalizer(
//!         move |id| fetch_customer(id),
//!         |err| err.to_string(),
//!     );
//!
//! let customer = slice.trigger(42).await?;
//! assert!(slice.get_state().status().is_success());
//!
//! slice.reset();
//! assert!(slice.get_state().status().is_idle());
//! ```

/// Slice configuration (abort hook for cooperative cancellation)
pub mod config;

/// Operation combinators: retry with backoff, timeout
pub mod ops;

/// The resource slice itself
pub mod slice;

/// Listener registration and RAII unsubscription
pub mod subscription;

pub use config::SliceConfig;
pub use ops::{RetryPolicy, with_retry, with_timeout};
pub use slice::ResourceSlice;
pub use subscription::Subscription;

// Re-export the core types a slice consumer needs
pub use resource_slice_core::{
    OperationFuture, RequestToken, ResourceState, ResourceStatus, TriggerError, display_error,
};
