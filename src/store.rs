//! Store Module
//!
//! Typed front door of the crate.
//!
//! A `Store` holds a coordinator, a codec, a compressor and a TTL sweeper
//! side by side and delegates to each explicitly:
//!
//! ```text
//! set(key, value) ─▶ Codec::serialize ─▶ Compressor::compress ─▶ Coordinator::set
//! get(key)        ◀─ Codec::deserialize ◀─ Compressor::decompress ◀─ Coordinator::get
//! erase(key)      ─▶ TtlSweeper::forget + Coordinator::erase
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::cache::MemoryCache;
use crate::codec::{compressor_for, Codec, Compressor, JsonCodec};
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::persistent::FileBackend;
use crate::sweeper::{SweeperHandle, TtlSweeper};

/// Embedded key-value store
pub struct Store<C: Codec = JsonCodec> {
    coordinator: Arc<Coordinator>,
    codec: C,
    compressor: Box<dyn Compressor>,
    sweeper: Arc<TtlSweeper>,
    sweeper_handle: Mutex<Option<SweeperHandle>>,
}

impl Store<JsonCodec> {
    /// Open or create a store with the given config, JSON-encoded
    ///
    /// On startup:
    /// 1. Validate config and create the data directory
    /// 2. Rebuild the durability set from existing record files
    /// 3. Start the TTL sweeper
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_codec(config, JsonCodec)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let mut config = Config::default();
        config.data_dir = path.to_path_buf();
        Self::open(config)
    }
}

impl<C: Codec> Store<C> {
    /// Open or create a store with an explicit codec
    pub fn open_with_codec(config: Config, codec: C) -> Result<Self> {
        config.validate()?;

        let persistent = Arc::new(FileBackend::open(
            &config.data_dir,
            &config.file_extension,
            config.sync_writes,
        )?);
        let cache = Arc::new(MemoryCache::new());
        let coordinator = Arc::new(Coordinator::open(persistent, cache)?);
        let sweeper = Arc::new(TtlSweeper::new(config.sweep_interval));

        let store = Self::from_parts(coordinator, codec, compressor_for(config.compression), sweeper);
        store.start_sweeper()?;

        info!(
            data_dir = %config.data_dir.display(),
            durable_keys = store.len(),
            "Store opened"
        );
        Ok(store)
    }

    /// Assemble a store from already-built parts
    ///
    /// The sweeper is left idle; call [`start_sweeper`](Self::start_sweeper)
    /// to begin expiring keys.
    pub fn from_parts(
        coordinator: Arc<Coordinator>,
        codec: C,
        compressor: Box<dyn Compressor>,
        sweeper: Arc<TtlSweeper>,
    ) -> Self {
        Self {
            coordinator,
            codec,
            compressor,
            sweeper,
            sweeper_handle: Mutex::new(None),
        }
    }

    /// Start the background TTL sweeper
    pub fn start_sweeper(&self) -> Result<()> {
        let handle = self.sweeper.run(Arc::clone(&self.coordinator))?;
        *self.sweeper_handle.lock() = Some(handle);
        Ok(())
    }

    /// Stop the background TTL sweeper and wait for it to exit
    pub fn stop_sweeper(&self) {
        let handle = self.sweeper_handle.lock().take();
        if let Some(handle) = handle {
            handle.stop();
        }
    }

    /// Store `value` under `key`
    ///
    /// With `durable = false` only the cache is written; the value becomes
    /// visible to `get` only if `key` already had a durable write.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, durable: bool) -> Result<()> {
        let encoded = self.codec.serialize(value)?;
        let record = self.compressor.compress(&encoded);
        self.coordinator.set(key, Bytes::from(record), durable)
    }

    /// Store `value` and expire it after roughly `ttl`
    ///
    /// The TTL is only armed once the write succeeds; a failed call leaves
    /// any earlier value and its TTL untouched.
    pub fn set_with_ttl<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        durable: bool,
        ttl: Duration,
    ) -> Result<()> {
        self.set(key, value, durable)?;
        self.sweeper.mark(key, ttl);
        Ok(())
    }

    /// Get the value for `key`, `None` if it has no durable write
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let record = match self.coordinator.get(key)? {
            Some(record) => record,
            None => return Ok(None),
        };
        let encoded = self.compressor.decompress(&record)?;
        self.codec.deserialize(&encoded).map(Some)
    }

    /// Erase `key` everywhere, including its TTL
    pub fn erase(&self, key: &str) -> Result<()> {
        self.sweeper.forget(key);
        self.coordinator.erase(key)
    }

    /// Set (overwrite) the TTL for `key`
    pub fn mark(&self, key: &str, ttl: Duration) {
        self.sweeper.mark(key, ttl);
    }

    /// Remaining TTL for `key`, if it has one
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        self.sweeper.remaining(key)
    }

    /// Check whether `key` has a durable write
    pub fn contains(&self, key: &str) -> bool {
        self.coordinator.contains(key)
    }

    /// All durable keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.coordinator.durable_keys()
    }

    pub fn len(&self) -> usize {
        self.coordinator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinator.is_empty()
    }

    /// Get the coordinator (raw byte access)
    ///
    /// Calls made through the coordinator bypass TTL bookkeeping: erasing a
    /// key here leaves its TTL armed, and that countdown will later erase a
    /// value written again under the same key. Use [`erase`](Self::erase)
    /// or [`TtlSweeper::forget`] to drop the TTL as well.
    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Get the TTL sweeper
    pub fn sweeper(&self) -> &Arc<TtlSweeper> {
        &self.sweeper
    }

    /// Close the store gracefully
    ///
    /// Stops the sweeper. Durable records are already on disk.
    pub fn close(self) {
        self.stop_sweeper();
    }
}
