//! Type aliases for injected operations.
//!
//! A slice is parameterized by one asynchronous operation, typically a thin
//! wrapper over an HTTP call. Operation-constructing layers (and test
//! doubles) type-erase their futures behind [`OperationFuture`] so a single
//! slice type can hold any of them.

use std::future::Future;
use std::pin::Pin;

/// Boxed future produced by a type-erased operation.
///
/// `T` is the fulfilled payload, `E` the rejection value *before* the
/// slice's normalizer runs (the two coincide when no normalizer is used).
pub type OperationFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;
