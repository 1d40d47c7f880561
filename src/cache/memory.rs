//! MemoryCache implementation
//!
//! HashMap-based cache with RwLock for concurrency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::Result;

use super::CacheBackend;

/// In-memory cache backend
///
/// ## Concurrency:
/// - `data`: RwLock (many concurrent readers, exclusive writer)
/// - `size`: approximate key + value bytes, updated under the write lock
pub struct MemoryCache {
    data: RwLock<HashMap<String, Bytes>>,
    size: AtomicUsize,
}

impl MemoryCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            size: AtomicUsize::new(0),
        }
    }

    /// Approximate size in bytes (keys + values)
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.clear();
        self.size.store(0, Ordering::Release);
    }

    /// Insert while holding the write lock, keeping `size` in step
    fn insert_locked(&self, data: &mut HashMap<String, Bytes>, key: &str, value: Bytes) {
        let added = value.len();
        match data.insert(key.to_string(), value) {
            Some(old) => {
                // Key already counted; swap value sizes
                self.size.fetch_sub(old.len(), Ordering::AcqRel);
                self.size.fetch_add(added, Ordering::AcqRel);
            }
            None => {
                self.size.fetch_add(key.len() + added, Ordering::AcqRel);
            }
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for MemoryCache {
    fn set(&self, key: &str, value: Bytes) -> Result<()> {
        let mut data = self.data.write();
        self.insert_locked(&mut data, key, value);
        Ok(())
    }

    fn get(&self, key: &str) -> Option<Bytes> {
        // Bytes clone is a refcount bump, not a copy
        self.data.read().get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    fn erase(&self, key: &str) -> Result<()> {
        let mut data = self.data.write();
        if let Some(old) = data.remove(key) {
            self.size.fetch_sub(key.len() + old.len(), Ordering::AcqRel);
        }
        Ok(())
    }

    fn insert_if_absent(&self, key: &str, value: Bytes) -> Result<bool> {
        let mut data = self.data.write();
        if data.contains_key(key) {
            return Ok(false);
        }
        self.insert_locked(&mut data, key, value);
        Ok(true)
    }
}
