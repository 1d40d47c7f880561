//! Cache Module
//!
//! In-memory front tier of the store.
//!
//! ## Responsibilities
//! - Fast reads and writes in memory
//! - Multi-reader / single-writer access
//! - Hold whatever the coordinator puts in it, nothing more
//!
//! ## Not Responsible For
//! - Eviction or capacity limits (expiry belongs to the TTL sweeper)
//! - Deciding what is visible (the coordinator's durability set does that)

mod memory;

use bytes::Bytes;

use crate::error::Result;

pub use memory::MemoryCache;

/// Thread-safe key → bytes mapping used as the cache tier
///
/// Implementations synchronize internally; every method takes `&self`.
pub trait CacheBackend: Send + Sync {
    /// Insert or overwrite the value for `key`
    fn set(&self, key: &str, value: Bytes) -> Result<()>;

    /// Get the value for `key`, `None` if absent
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Check whether `key` is cached
    fn contains(&self, key: &str) -> bool;

    /// Remove `key`; removing an absent key is not an error
    fn erase(&self, key: &str) -> Result<()>;

    /// Insert only when `key` is absent. Returns true if the value was stored.
    ///
    /// The default is a check-then-set and is not atomic; implementations
    /// that can do better should override it.
    fn insert_if_absent(&self, key: &str, value: Bytes) -> Result<bool> {
        if self.contains(key) {
            return Ok(false);
        }
        self.set(key, value)?;
        Ok(true)
    }
}
