//! Cache refill worker
//!
//! A read that misses the cache hands the value it fetched from the
//! persistent tier to this worker and returns immediately. The worker writes
//! it back into the cache on its own thread. Refills are advisory: nothing
//! waits on them and nothing depends on them for correctness.
//!
//! A refill is applied under a shared lock on the durability set and only if
//! the key is still durable. An `erase` that lands between the miss and the
//! refill therefore wins, and no stale entry is left behind in the cache.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::cache::CacheBackend;
use crate::error::{KvError, Result};

/// Handle to the background refill thread
///
/// Dropping the handle closes the queue; the thread drains what is left and exits.
pub(crate) struct CacheRefiller {
    tx: Option<Sender<(String, Bytes)>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl CacheRefiller {
    /// Spawn the refill thread for `cache`, gated on `durable`
    pub(crate) fn start(
        cache: Arc<dyn CacheBackend>,
        durable: Arc<RwLock<HashSet<String>>>,
    ) -> Result<Self> {
        let (tx, rx) = channel::unbounded();

        let thread = thread::Builder::new()
            .name("asidekv-refill".to_string())
            .spawn(move || refill_loop(cache, durable, rx))
            .map_err(|e| KvError::Cache(format!("Failed to spawn refill thread: {}", e)))?;

        Ok(Self {
            tx: Some(tx),
            thread: Some(thread),
        })
    }

    /// Queue a refill; never blocks
    pub(crate) fn submit(&self, key: &str, value: Bytes) {
        if let Some(tx) = &self.tx {
            if tx.send((key.to_string(), value)).is_err() {
                trace!(key, "Refill queue closed, dropping refill");
            }
        }
    }
}

impl Drop for CacheRefiller {
    fn drop(&mut self) {
        // Disconnect first so the loop sees the end of the queue
        self.tx.take();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn refill_loop(
    cache: Arc<dyn CacheBackend>,
    durable: Arc<RwLock<HashSet<String>>>,
    rx: Receiver<(String, Bytes)>,
) {
    for (key, value) in rx.iter() {
        let durable_keys = durable.read();
        if !durable_keys.contains(&key) {
            trace!(key = %key, "Key erased before refill, refill skipped");
            continue;
        }

        // A value written by a Set after our read must win over the refill
        match cache.insert_if_absent(&key, value) {
            Ok(true) => debug!(key = %key, "Cache repopulated"),
            Ok(false) => trace!(key = %key, "Cache already populated, refill skipped"),
            Err(e) => warn!(key = %key, error = %e, "Cache refill failed"),
        }
    }
}
