//! Interning of offset amounts.
//!
//! Zones typically have hundreds of transitions but only a handful of
//! distinct offsets. Every [`Delta`] with the same amount of seconds
//! shares one allocation, across all zones built in the process.
use crate::Offset;
use crate::tz::sync::SyncCell;
use ahash::AHashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::trace;

/// Above this many entries, an insert first evicts unused entries.
const SOFT_CAPACITY: usize = 256;

static DELTAS: LazyLock<SyncCell<DeltaCache>> =
    LazyLock::new(|| SyncCell::new(DeltaCache::new()));

/// A shared, immutable amount of seconds, used for UTC and DST offsets.
#[derive(Clone)]
pub struct Delta(Arc<Offset>);

impl Delta {
    /// The amount in seconds
    #[inline]
    pub fn seconds(&self) -> Offset {
        *self.0
    }

    /// Whether both handles share the same allocation
    pub fn ptr_eq(&self, other: &Delta) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Delta {
    fn eq(&self, other: &Self) -> bool {
        self.seconds() == other.seconds()
    }
}

impl Eq for Delta {}

impl fmt::Debug for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Delta({})", self.seconds())
    }
}

/// Lookup table of interned deltas.
///
/// The table holds a strong handle to each entry, but treats it as weak:
/// an entry whose only owner is the table itself is unused and may be
/// evicted.
#[derive(Debug, Default)]
pub(crate) struct DeltaCache {
    entries: AHashMap<Offset, Delta>,
}

impl DeltaCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get_or_insert(&mut self, seconds: Offset) -> Delta {
        if let Some(d) = self.entries.get(&seconds) {
            return d.clone();
        }
        if self.entries.len() >= SOFT_CAPACITY {
            self.sweep();
        }
        let d = Delta(Arc::new(seconds));
        self.entries.insert(seconds, d.clone());
        d
    }

    /// Drop entries which nobody outside the cache refers to.
    /// Returns the number of evicted entries.
    pub(crate) fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, d| Arc::strong_count(&d.0) > 1);
        let evicted = before - self.entries.len();
        trace!(evicted, remaining = self.entries.len(), "swept delta cache");
        evicted
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Get the shared [`Delta`] for the given amount of seconds.
pub fn delta(seconds: Offset) -> Delta {
    DELTAS.with_mut(|cache| cache.get_or_insert(seconds))
}

/// Evict interned deltas which are no longer in use anywhere.
/// Returns the number of evicted entries.
pub fn sweep() -> usize {
    DELTAS.with_mut(DeltaCache::sweep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_allocation() {
        let mut cache = DeltaCache::new();
        let a = cache.get_or_insert(3_600);
        let b = cache.get_or_insert(3_600);
        let c = cache.get_or_insert(-18_000);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(a, b);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_sweep_only_unused() {
        let mut cache = DeltaCache::new();
        let kept = cache.get_or_insert(7_200);
        drop(cache.get_or_insert(0));
        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        // the surviving entry is still the same allocation
        assert!(cache.get_or_insert(7_200).ptr_eq(&kept));
    }

    #[test]
    fn test_soft_capacity() {
        let mut cache = DeltaCache::new();
        for s in 0..SOFT_CAPACITY as Offset {
            cache.get_or_insert(s);
        }
        assert_eq!(cache.len(), SOFT_CAPACITY);
        // nothing is held externally, so the next insert evicts everything else
        let d = cache.get_or_insert(-1);
        assert_eq!(cache.len(), 1);
        assert_eq!(d.seconds(), -1);
    }

    #[test]
    fn test_global() {
        let a = delta(-14_400);
        assert!(a.ptr_eq(&delta(-14_400)));
    }
}
