//! Synchronization for the process-wide caches.
//!
//! Both caches (interned offsets and zones by key) are advisory:
//! a lost update only costs an extra allocation. Therefore a poisoned
//! lock is recovered rather than propagated.
use std::sync::{Mutex, PoisonError};

/// A cell that provides interior mutability with mutex synchronization.
pub(crate) struct SyncCell<T>(Mutex<T>);

impl<T> std::fmt::Debug for SyncCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCell").finish_non_exhaustive()
    }
}

impl<T> SyncCell<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self(Mutex::new(value))
    }

    /// Access the inner value mutably under the mutex.
    #[inline]
    pub(crate) fn with_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
