//! # Resource Slice Testing
//!
//! Deterministic test doubles for exercising resource slices.
//!
//! This crate provides:
//! - [`GatedOperation`]: in-flight calls that the test settles manually,
//!   in any order, for reproducing supersession races exactly
//! - [`ScriptedOperation`]: a FIFO queue of pre-arranged outcomes
//! - [`StateRecorder`]: a listener that captures every committed snapshot
//!
//! ## Example
//!
//! ```ignore
//! use resource_slice_runtime::ResourceSlice;
//! use resource_slice_testing::{GatedOperation, StateRecorder};
//!
//! #[tokio::test]
//! async fn late_response_is_discarded() {
//!     let gate = GatedOperation::<u32, String, String>::new();
//!     let slice = ResourceSlice::new(gate.operation());
//!
//!     let first = slice.trigger(1);
//!     let second = slice.trigger(2);
//!
//!     gate.settle(1, Ok("second".into()));
//!     assert_eq!(second.await.unwrap(), "second");
//!
//!     gate.settle(0, Ok("first".into()));
//!     assert_eq!(first.await.unwrap(), "first"); // caller sees its own outcome
//!     assert_eq!(slice.get_state().result().unwrap(), "second"); // store does not
//! }
//! ```

/// Manually settled and pre-scripted operations
pub mod operations;

/// Committed-state capture for notification assertions
pub mod recorder;

pub use operations::{GatedOperation, ScriptedOperation};
pub use recorder::StateRecorder;
