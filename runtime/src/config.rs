//! Configuration for slice instances.

use std::sync::Arc;

/// Configuration for a [`ResourceSlice`](crate::ResourceSlice).
///
/// Stale settlements are always discarded by the token guard; the options
/// here are enhancements on top of that baseline.
///
/// # Example
///
/// ```ignore
/// let config = SliceConfig::new()
///     .with_abort_hook(move || abort_handle.abort());
///
/// let slice = ResourceSlice::with_config(operation, normalize, config);
/// ```
#[derive(Clone, Default)]
pub struct SliceConfig {
    /// Invoked when an in-flight attempt is superseded by a newer trigger
    /// or by reset. Cooperative cancellation only: correctness never
    /// depends on the hook, since the superseded settlement is discarded
    /// regardless.
    pub(crate) on_supersede: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl SliceConfig {
    /// Create a configuration with no abort hook
    #[must_use]
    pub const fn new() -> Self {
        Self { on_supersede: None }
    }

    /// Set a hook fired when an in-flight attempt is superseded.
    ///
    /// Use this to trigger real cancellation (an abort handle, a
    /// cancellation signal) when the operation supports it. The hook runs
    /// on whichever task performed the superseding `trigger` or `reset`,
    /// so it must be cheap and must not block.
    #[must_use]
    pub fn with_abort_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_supersede = Some(Arc::new(hook));
        self
    }
}

impl std::fmt::Debug for SliceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliceConfig")
            .field("abort_hook", &self.on_supersede.is_some())
            .finish()
    }
}
