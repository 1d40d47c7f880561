//! TTL Sweeper
//!
//! Background thread that counts down per-key time-to-live and erases
//! expired keys through the coordinator.
//!
//! ## Design
//!
//! Every tick (fixed interval, default 60s):
//! 1. Under the sweeper lock, subtract the interval from every counter
//! 2. Collect and drop every key whose counter reached <= 0
//! 3. Release the lock, then call `Coordinator::erase` for each expired key
//!
//! Erasing happens outside the sweeper lock so the coordinator lock is never
//! acquired while the TTL map is held.
//!
//! Expiry is coarse: a key marked with less than one interval left still
//! waits for the next tick.
//!
//! ## Lifecycle
//! ```text
//! Idle ──run()──▶ Sweeping ──stop()/drop handle──▶ Stopped
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::coordinator::Coordinator;
use crate::error::{KvError, Result};

/// Sweeper lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweeperState {
    /// Created, not ticking yet
    Idle,
    /// Background thread is ticking
    Sweeping,
    /// Shut down; cannot be restarted
    Stopped,
}

/// Per-key TTL bookkeeping plus the sweep loop
pub struct TtlSweeper {
    /// key → remaining time-to-live in milliseconds
    ttl: Mutex<HashMap<String, i64>>,

    /// Fixed tick interval
    interval: Duration,

    state: Mutex<SweeperState>,
}

impl TtlSweeper {
    /// Create an idle sweeper with the given tick interval
    pub fn new(interval: Duration) -> Self {
        Self {
            ttl: Mutex::new(HashMap::new()),
            interval,
            state: Mutex::new(SweeperState::Idle),
        }
    }

    /// Set the remaining time-to-live for `key`
    ///
    /// Overwrites any existing countdown; it is never extended additively.
    pub fn mark(&self, key: &str, ttl: Duration) {
        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.ttl.lock().insert(key.to_string(), millis);
        debug!(key, ttl_ms = millis, "TTL marked");
    }

    /// Stop tracking `key`. Returns true if it had a TTL.
    pub fn forget(&self, key: &str) -> bool {
        self.ttl.lock().remove(key).is_some()
    }

    /// Remaining time-to-live for `key`, if tracked
    pub fn remaining(&self, key: &str) -> Option<Duration> {
        self.ttl
            .lock()
            .get(key)
            .map(|&ms| Duration::from_millis(ms.max(0) as u64))
    }

    /// Number of keys with a TTL
    pub fn tracked(&self) -> usize {
        self.ttl.lock().len()
    }

    /// Get the tick interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> SweeperState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SweeperState::Sweeping
    }

    /// Advance every countdown by one interval and take the expired keys
    ///
    /// Expired keys are removed from the TTL map before this returns.
    pub fn collect_expired(&self) -> Vec<String> {
        let step = i64::try_from(self.interval.as_millis()).unwrap_or(i64::MAX);
        let mut ttl = self.ttl.lock();

        let mut expired = Vec::new();
        for (key, remaining) in ttl.iter_mut() {
            *remaining = remaining.saturating_sub(step);
            if *remaining <= 0 {
                expired.push(key.clone());
            }
        }
        for key in &expired {
            ttl.remove(key);
        }

        expired
    }

    /// Run one sweep against `coordinator`, returning the keys that expired
    ///
    /// Erase failures are logged; nobody is waiting on them.
    pub fn tick(&self, coordinator: &Coordinator) -> Vec<String> {
        let expired = self.collect_expired();

        for key in &expired {
            if let Err(e) = coordinator.erase(key) {
                warn!(key = %key, error = %e, "Failed to erase expired key");
            }
        }

        if !expired.is_empty() {
            debug!(
                expired = expired.len(),
                tracked = self.tracked(),
                "Expired keys swept"
            );
        }

        expired
    }

    /// Start ticking on a background thread
    ///
    /// Transitions Idle → Sweeping. The returned handle stops the thread
    /// when it is dropped or [`stop`](SweeperHandle::stop)ped.
    pub fn run(self: &Arc<Self>, coordinator: Arc<Coordinator>) -> Result<SweeperHandle> {
        {
            let mut state = self.state.lock();
            if *state != SweeperState::Idle {
                return Err(KvError::Sweeper(format!(
                    "cannot start sweeper in state {:?}",
                    *state
                )));
            }
            *state = SweeperState::Sweeping;
        }

        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
        let sweeper = Arc::clone(self);

        let spawned = thread::Builder::new()
            .name("asidekv-ttl-sweeper".to_string())
            .spawn(move || sweep_loop(sweeper, coordinator, shutdown_rx));

        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                *self.state.lock() = SweeperState::Idle;
                return Err(KvError::Sweeper(format!(
                    "Failed to spawn sweeper thread: {}",
                    e
                )));
            }
        };

        info!(interval_ms = self.interval.as_millis() as u64, "TTL sweeper started");

        Ok(SweeperHandle {
            sweeper: Arc::clone(self),
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }
}

/// Handle to a running sweeper thread
///
/// Dropping this handle signals the thread to stop and waits for it.
pub struct SweeperHandle {
    sweeper: Arc<TtlSweeper>,
    shutdown_tx: Option<Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl SweeperHandle {
    /// Request shutdown and wait for the background thread to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Check if the sweeper thread is still alive
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().map_or(false, |h| !h.is_finished())
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the channel and wakes the loop
        self.shutdown_tx.take();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
            *self.sweeper.state.lock() = SweeperState::Stopped;
            info!("TTL sweeper stopped");
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Main sweep loop, runs on the background thread
fn sweep_loop(sweeper: Arc<TtlSweeper>, coordinator: Arc<Coordinator>, shutdown: Receiver<()>) {
    let ticker = channel::tick(sweeper.interval);

    loop {
        crossbeam::select! {
            recv(ticker) -> _ => {
                sweeper.tick(&coordinator);
            }
            recv(shutdown) -> _ => {
                debug!("TTL sweeper received shutdown signal");
                return;
            }
        }
    }
}
