//! Identity cache of zones by key.
//!
//! Loading the same key twice gives the same [`ZoneInfo`] object, as long as
//! somebody still holds on to it. This is based on the cache approach of
//! zoneinfo in Python's standard library.
use crate::tz::sync::SyncCell;
use crate::tz::tzpath::{TzPath, validate_key};
use crate::tz::zone::{LoadError, ZoneInfo};
use ahash::AHashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace};

const LRU_CAPACITY: usize = 8; // this value seems to work well for Python's zoneinfo

type Lru = VecDeque<Arc<ZoneInfo>>;
type Lookup = AHashMap<String, Arc<ZoneInfo>>;

/// Whether anybody besides the lookup table holds the zone.
/// Only the lookup table can hand out new references, and it's behind the lock.
/// Thus, once this is false it stays false.
fn is_alive(tz: &Arc<ZoneInfo>) -> bool {
    Arc::strong_count(tz) > 1
}

#[derive(Debug)]
struct CacheInner {
    // References to the zones, keyed by TZ ID.
    // These are treated as weak references: an entry is only valid while
    // there's another strong reference, held by (1) users of the store, or (2) the LRU.
    //
    // "Ahash" works significantly faster than the standard hashing algorithm.
    // We don't need the cryptographic security of the standard algorithm,
    // since the keys are trusted (they are limited to valid zoneinfo keys).
    //
    // Cleanup strategy:
    // Dead entries are removed when encountered, and swept on every insert.
    lookup: Lookup,
    // Keeps the most recently used entries alive, to prevent over-eager dropping.
    //
    // For example, if constantly loading and dropping the same zone,
    // we don't want to keep reloading the same file.
    lru: Lru,
}

impl CacheInner {
    /// Look up a live entry, and register it as recently used.
    fn get_alive(&mut self, key: &str) -> Option<Arc<ZoneInfo>> {
        match self.lookup.get(key) {
            Some(tz) if is_alive(tz) => {
                let tz = Arc::clone(tz);
                self.promote_lru(&tz);
                Some(tz)
            }
            Some(_) => {
                trace!(key, "dropping dead cache entry");
                self.lookup.remove(key);
                None
            }
            None => None,
        }
    }

    /// Register the given zone was "used recently", moving it to the front of the LRU.
    fn promote_lru(&mut self, tz: &Arc<ZoneInfo>) {
        match self.lru.iter().position(|x| Arc::ptr_eq(x, tz)) {
            Some(0) => {} // Already at the front
            Some(i) => {
                if let Some(x) = self.lru.remove(i) {
                    self.lru.push_front(x);
                }
            }
            None => {
                // If the LRU exceeds capacity, remove the least recently used entry
                if self.lru.len() == LRU_CAPACITY {
                    self.lru.pop_back();
                }
                self.lru.push_front(Arc::clone(tz));
            }
        }
    }

    fn sweep(&mut self) -> usize {
        let before = self.lookup.len();
        self.lookup.retain(|_, tz| is_alive(tz));
        before - self.lookup.len()
    }
}

/// Zone cache, shareable between threads.
#[derive(Debug)]
struct Cache {
    inner: SyncCell<CacheInner>,
}

impl Cache {
    fn new() -> Self {
        Self {
            inner: SyncCell::new(CacheInner {
                lru: VecDeque::with_capacity(LRU_CAPACITY),
                lookup: AHashMap::with_capacity(8), // a reasonable default size
            }),
        }
    }

    /// Get an entry from the cache, or insert it from the supplied function.
    /// The load function is called outside the lock to avoid holding it during I/O.
    fn get_or_insert_with<F>(&self, key: &str, load: F) -> Result<Arc<ZoneInfo>, LoadError>
    where
        F: FnOnce() -> Result<ZoneInfo, LoadError>,
    {
        if let Some(tz) = self.inner.with_mut(|inner| inner.get_alive(key)) {
            trace!(key, "zone cache hit");
            return Ok(tz);
        }

        // Cache miss: load outside the lock (may do file I/O)
        debug!(key, "zone cache miss");
        let loaded = Arc::new(load()?);

        // Re-acquire lock to insert. Another thread may have loaded the same key.
        Ok(self.inner.with_mut(|inner| {
            inner.get_alive(key).unwrap_or_else(|| {
                let evicted = inner.sweep();
                if evicted > 0 {
                    trace!(evicted, "swept zone cache");
                }
                inner.promote_lru(&loaded);
                inner.lookup.insert(key.to_string(), Arc::clone(&loaded));
                loaded
            })
        }))
    }

    /// Clear the cache, dropping all entries.
    /// Zones still held elsewhere stay valid, but are no longer shared with new loads.
    fn clear_all(&self) {
        self.inner.with_mut(|CacheInner { lookup, lru }| {
            lookup.clear();
            lru.clear();
        });
    }

    /// Clear specific entries from the cache.
    fn clear_only(&self, keys: &[&str]) {
        self.inner.with_mut(|CacheInner { lookup, lru }| {
            for &k in keys {
                lookup.remove(k); // Always remove, regardless of refcount
                lru.retain(|tz| tz.key() != Some(k));
            }
        });
    }
}

/// Access layer for zones, looked up by key in a search path.
#[derive(Debug)]
pub struct ZoneStore {
    cache: Cache,
    // The paths to search for zoneinfo files. Patchable during runtime.
    tzpath: SyncCell<TzPath>,
}

impl ZoneStore {
    pub fn new(tzpath: TzPath) -> Self {
        Self {
            cache: Cache::new(),
            tzpath: SyncCell::new(tzpath),
        }
    }

    /// A store with the search path configured from the environment
    pub fn from_env() -> Self {
        Self::new(TzPath::from_env())
    }

    pub fn tzpath(&self) -> TzPath {
        self.tzpath.with_mut(|p| p.clone())
    }

    /// Change the search path. Cached zones are unaffected.
    pub fn set_tzpath(&self, tzpath: TzPath) {
        self.tzpath.with_mut(|p| *p = tzpath);
    }

    /// Fetches the zone for the given IANA time zone ID.
    pub fn get(&self, key: &str) -> Result<Arc<ZoneInfo>, LoadError> {
        self.get_or_insert_with(key, || ZoneInfo::load(key, &self.tzpath()))
    }

    /// Like [`get`](Self::get), but with a custom source of zone data
    /// (e.g. data bundled with the application) in case of a cache miss.
    pub fn get_or_insert_with<F>(&self, key: &str, load: F) -> Result<Arc<ZoneInfo>, LoadError>
    where
        F: FnOnce() -> Result<ZoneInfo, LoadError>,
    {
        validate_key(key)?;
        self.cache.get_or_insert_with(key, load)
    }

    /// Load a fresh zone, bypassing (and not affecting) the cache.
    pub fn no_cache(&self, key: &str) -> Result<ZoneInfo, LoadError> {
        ZoneInfo::load(key, &self.tzpath())
    }

    /// Clear the cache, or only the given keys.
    pub fn clear_cache(&self, only_keys: Option<&[&str]>) {
        match only_keys {
            Some(keys) => self.cache.clear_only(keys),
            None => self.cache.clear_all(),
        }
    }

    /// Remove entries which are no longer held anywhere.
    /// Returns the number of removed entries.
    pub fn sweep(&self) -> usize {
        self.cache.inner.with_mut(CacheInner::sweep)
    }

    /// The number of entries in the lookup table, including dead ones not yet swept
    pub fn len(&self) -> usize {
        self.cache.inner.with_mut(|inner| inner.lookup.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
