//! Listener registration and RAII unsubscription.

/// Guard for one registered listener.
///
/// Returned by [`ResourceSlice::subscribe`](crate::ResourceSlice::subscribe).
/// Dropping the guard removes the listener; [`Subscription::detach`] keeps
/// the listener registered for the lifetime of the slice instead.
///
/// # Example
///
/// ```ignore
/// let subscription = slice.subscribe(|state| render(state));
/// // ... later:
/// subscription.unsubscribe();
/// ```
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the listener now.
    ///
    /// Equivalent to dropping the guard; provided for call sites where the
    /// intent should be explicit.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the listener registered for the lifetime of the slice,
    /// consuming the guard without removing the listener.
    pub fn detach(mut self) {
        self.cancel = None;
    }

    /// Whether this guard still controls a registered listener
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
