//! Operation combinators: retry with exponential backoff, timeout.
//!
//! The slice itself owns neither retries nor timeouts. Both belong to the
//! injected operation, and both are expressed here as wrappers that take an
//! operation and return an operation, so they compose with each other and
//! plug straight into [`ResourceSlice`](crate::ResourceSlice) construction.
//! A timeout rejection reaches the slice as an ordinary rejection.
//!
//! # Example
//!
//! ```ignore
//! use resource_slice_runtime::{ResourceSlice, RetryPolicy, with_retry, with_timeout};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new()
//!     .with_max_retries(5)
//!     .with_initial_delay(Duration::from_millis(100));
//!
//! let operation = with_retry(policy, with_timeout(
//!     Duration::from_secs(10),
//!     || "request timed out".to_string(),
//!     move |id| fetch_customer(id),
//! ));
//!
//! let slice = ResourceSlice::new(operation);
//! ```

use resource_slice_core::OperationFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Backoff schedule for [`with_retry`].
///
/// Defaults to three retries, starting at 100ms and doubling per retry up
/// to a 30-second ceiling. Adjusted through `with_*` methods, like
/// [`SliceConfig`](crate::SliceConfig).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl RetryPolicy {
    /// The default schedule: 3 retries, 100ms before the first, doubling,
    /// capped at 30 seconds
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }

    /// Set how many retries follow the initial attempt
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the ceiling no backoff delay exceeds
    #[must_use]
    pub const fn with_max_delay(mut self, ceiling: Duration) -> Self {
        self.max_delay = ceiling;
        self
    }

    /// Set the factor the delay grows by per retry.
    ///
    /// Values below 1.0 are treated as 1.0 (a constant delay).
    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Delay before the next retry, given how many retries already ran.
    ///
    /// Grows geometrically from the initial delay and never exceeds the
    /// configured ceiling.
    #[must_use]
    pub fn delay_before_retry(&self, retries_so_far: u32) -> Duration {
        let exponent = i32::try_from(retries_so_far).unwrap_or(i32::MAX);
        let scaled = self.initial_delay.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        // f64::min yields the ceiling when `scaled` overflowed to infinity
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap an operation with exponential-backoff retries.
///
/// Each attempt re-invokes the inner operation with a clone of the
/// parameters. The wrapped operation settles with the first success, or
/// with the final error once retries are exhausted.
pub fn with_retry<P, T, E, Op, Fut>(
    policy: RetryPolicy,
    operation: Op,
) -> impl Fn(P) -> OperationFuture<T, E> + Send + Sync + 'static
where
    P: Clone + Send + 'static,
    T: Send + 'static,
    E: std::fmt::Display + Send + 'static,
    Op: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let operation = Arc::new(operation);

    move |params: P| {
        let operation = Arc::clone(&operation);
        let policy = policy.clone();

        Box::pin(async move {
            let mut retries = 0u32;

            loop {
                match operation(params.clone()).await {
                    Ok(value) => {
                        if retries > 0 {
                            tracing::info!(retries, "Operation succeeded after retry");
                        }
                        return Ok(value);
                    },
                    Err(error) => {
                        if retries >= policy.max_retries {
                            tracing::error!(
                                retries,
                                error = %error,
                                "Operation failed after max retries"
                            );
                            return Err(error);
                        }

                        let delay = policy.delay_before_retry(retries);
                        tracing::warn!(
                            retries,
                            delay_ms = delay.as_millis(),
                            error = %error,
                            "Operation failed, retrying..."
                        );

                        sleep(delay).await;
                        retries += 1;
                    },
                }
            }
        })
    }
}

/// Wrap an operation with a deadline.
///
/// If the inner operation does not settle within `duration`, the wrapped
/// operation rejects with the error produced by `on_timeout`. The slice
/// treats that rejection like any other.
pub fn with_timeout<P, T, E, Op, Fut, OnTimeout>(
    duration: Duration,
    on_timeout: OnTimeout,
    operation: Op,
) -> impl Fn(P) -> OperationFuture<T, E> + Send + Sync + 'static
where
    P: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    Op: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    OnTimeout: Fn() -> E + Send + Sync + 'static,
{
    let on_timeout = Arc::new(on_timeout);

    move |params: P| {
        let future = operation(params);
        let on_timeout = Arc::clone(&on_timeout);

        Box::pin(async move {
            match tokio::time::timeout(duration, future).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(
                        timeout_ms = duration.as_millis(),
                        "Operation timed out"
                    );
                    Err(on_timeout())
                },
            }
        })
    }
}
