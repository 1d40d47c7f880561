//! Coordinator Module
//!
//! Glues the cache and persistent tiers together under a cache-aside policy.
//!
//! ## Responsibilities
//! - Cache-aside `get`, `set` and `erase`
//! - Own the durability set (keys with a confirmed persistent write)
//! - Keep cache and persistent tier consistent under concurrent callers
//!
//! ## Visibility Rule
//! A key that is not in the durability set is reported absent by `get`,
//! whatever the cache holds. A cache-only write (`durable = false`) is
//! therefore only visible for keys that already had a durable write.

mod refill;

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::cache::CacheBackend;
use crate::error::Result;
use crate::persistent::PersistentBackend;

use refill::CacheRefiller;

/// The storage coordinator
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// One coordinator-wide `RwLock` guards the durability set and, through it,
/// every operation:
///
/// - **Writes** (set/erase): exclusive lock
///   - No two writes interleave their cache-write / persistent-write pair
/// - **Reads** (get): shared lock
///   - Many concurrent readers, excluded by any in-flight write
///
/// Backends keep their own internal locks; the coordinator never holds one
/// of theirs across calls. Cache refills after a miss run on a separate
/// thread. They take the coordinator lock shared and then the cache's lock,
/// the same order writers use, so they cannot deadlock with a writer.
pub struct Coordinator {
    /// Durable tier (source of truth)
    persistent: Arc<dyn PersistentBackend>,

    /// Cache tier (always secondary)
    cache: Arc<dyn CacheBackend>,

    /// Keys with a confirmed persistent write; also the coordinator lock
    ///
    /// Shared with the refill worker, which only repopulates durable keys.
    durable: Arc<RwLock<HashSet<String>>>,

    /// Background cache repopulation after misses
    refiller: CacheRefiller,
}

impl Coordinator {
    /// Create a coordinator with an empty durability set
    pub fn new(
        persistent: Arc<dyn PersistentBackend>,
        cache: Arc<dyn CacheBackend>,
    ) -> Result<Self> {
        let durable = Arc::new(RwLock::new(HashSet::new()));
        let refiller = CacheRefiller::start(Arc::clone(&cache), Arc::clone(&durable))?;

        Ok(Self {
            persistent,
            cache,
            durable,
            refiller,
        })
    }

    /// Create a coordinator and seed the durability set from the records the
    /// persistent backend already holds
    pub fn open(
        persistent: Arc<dyn PersistentBackend>,
        cache: Arc<dyn CacheBackend>,
    ) -> Result<Self> {
        let keys = persistent.keys()?;
        let coordinator = Self::new(persistent, cache)?;

        if !keys.is_empty() {
            info!(records = keys.len(), "Recovered durable keys from persistent backend");
        }
        coordinator.durable.write().extend(keys);

        Ok(coordinator)
    }

    /// Store `value` under `key`
    ///
    /// Steps:
    /// 1. Acquire exclusive lock
    /// 2. Write to the cache (unconditionally)
    /// 3. If `durable`: write to the persistent tier, then record the key as durable
    ///
    /// A failed persistent write is returned as-is and the cache write is
    /// not rolled back; the cache may be ahead of durable storage.
    pub fn set(&self, key: &str, value: Bytes, durable: bool) -> Result<()> {
        let mut durable_keys = self.durable.write();

        self.cache.set(key, value.clone())?;

        if durable {
            self.persistent.store(key, &value)?;
            durable_keys.insert(key.to_string());
            debug!(key, bytes = value.len(), "Durable write");
        } else {
            debug!(key, bytes = value.len(), "Cache-only write");
        }

        Ok(())
    }

    /// Get the value for `key`
    ///
    /// Returns:
    /// - `Ok(Some(value))`: key is durable; served from cache or persistent tier
    /// - `Ok(None)`: key has no durable write (cache is not consulted)
    /// - `Err(KvError::BackendRead)`: key is durable but its record could not be read
    ///
    /// On a cache miss the value read from the persistent tier is queued for
    /// cache repopulation; the caller does not wait for it.
    pub fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let durable_keys = self.durable.read();

        if !durable_keys.contains(key) {
            return Ok(None);
        }

        if let Some(value) = self.cache.get(key) {
            debug!(key, "Cache hit");
            return Ok(Some(value));
        }

        debug!(key, "Cache miss, reading persistent record");
        let value = match self.persistent.read(key) {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                error!(key, error = %e, "Durable key has no readable record");
                return Err(e);
            }
        };

        self.refiller.submit(key, value.clone());

        Ok(Some(value))
    }

    /// Erase `key` from both tiers and the durability set
    ///
    /// Both deletes are attempted even if the first one fails. A persistent
    /// delete failure is returned (the record may be orphaned); a cache
    /// failure is returned only when the persistent delete succeeded.
    /// Erasing an absent key succeeds.
    pub fn erase(&self, key: &str) -> Result<()> {
        let mut durable_keys = self.durable.write();

        let persistent_result = self.persistent.delete(key);
        if let Err(e) = &persistent_result {
            error!(key, error = %e, "Persistent delete failed, record may be orphaned");
        }

        let cache_result = self.cache.erase(key);
        if let Err(e) = &cache_result {
            warn!(key, error = %e, "Cache erase failed");
        }

        durable_keys.remove(key);
        debug!(key, "Erased");

        persistent_result.and(cache_result)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Check whether `key` has a confirmed durable write
    pub fn contains(&self, key: &str) -> bool {
        self.durable.read().contains(key)
    }

    /// All durable keys, sorted
    pub fn durable_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.durable.read().iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of durable keys
    pub fn len(&self) -> usize {
        self.durable.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.durable.read().is_empty()
    }

    /// Get the cache backend
    pub fn cache(&self) -> &Arc<dyn CacheBackend> {
        &self.cache
    }

    /// Get the persistent backend
    pub fn persistent(&self) -> &Arc<dyn PersistentBackend> {
        &self.persistent
    }
}
