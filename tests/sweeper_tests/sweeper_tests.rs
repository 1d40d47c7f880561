//! Tests for TtlSweeper
//!
//! These tests verify:
//! - Mark overwrites rather than extends
//! - Countdown and coarse expiry per tick
//! - Expired keys are erased through the coordinator
//! - Lifecycle (Idle → Sweeping → Stopped)

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use asidekv::cache::MemoryCache;
use asidekv::persistent::{FileBackend, PersistentBackend};
use asidekv::{Coordinator, KvError, Result, SweeperState, TtlSweeper};
use bytes::Bytes;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_coordinator() -> (TempDir, Arc<FileBackend>, Arc<Coordinator>) {
    let temp_dir = TempDir::new().unwrap();
    let backend = Arc::new(FileBackend::open(temp_dir.path(), "kv", false).unwrap());
    let coordinator = Coordinator::new(backend.clone(), Arc::new(MemoryCache::new())).unwrap();
    (temp_dir, backend, Arc::new(coordinator))
}

/// Poll until `cond` holds or two seconds pass
fn eventually(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// Backend whose deletes always fail
struct UndeletableBackend;

impl PersistentBackend for UndeletableBackend {
    fn store(&self, _key: &str, _value: &[u8]) -> Result<()> {
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        Err(KvError::BackendRead {
            key: key.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no record"),
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        Err(KvError::Erase {
            key: key.to_string(),
            reason: "read-only filesystem".to_string(),
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

// =============================================================================
// Mark Tests
// =============================================================================

#[test]
fn test_mark_tracks_key() {
    let sweeper = TtlSweeper::new(Duration::from_secs(60));

    sweeper.mark("key", Duration::from_secs(5));

    assert_eq!(sweeper.tracked(), 1);
    assert_eq!(sweeper.remaining("key"), Some(Duration::from_secs(5)));
    assert_eq!(sweeper.remaining("other"), None);
}

#[test]
fn test_mark_overwrites_not_extends() {
    let sweeper = TtlSweeper::new(Duration::from_secs(1));

    sweeper.mark("key", Duration::from_secs(5));
    sweeper.collect_expired();
    assert_eq!(sweeper.remaining("key"), Some(Duration::from_secs(4)));

    sweeper.mark("key", Duration::from_secs(2));

    assert_eq!(sweeper.remaining("key"), Some(Duration::from_secs(2)));
}

#[test]
fn test_forget() {
    let sweeper = TtlSweeper::new(Duration::from_secs(1));
    sweeper.mark("key", Duration::from_secs(5));

    assert!(sweeper.forget("key"));
    assert!(!sweeper.forget("key"));
    assert_eq!(sweeper.tracked(), 0);
}

// =============================================================================
// Countdown Tests
// =============================================================================

#[test]
fn test_countdown_by_interval() {
    let sweeper = TtlSweeper::new(Duration::from_secs(1));

    sweeper.mark("short", Duration::from_secs(1));
    sweeper.mark("long", Duration::from_secs(3));

    assert_eq!(sweeper.collect_expired(), vec!["short".to_string()]);
    assert_eq!(sweeper.remaining("long"), Some(Duration::from_secs(2)));

    assert!(sweeper.collect_expired().is_empty());
    assert_eq!(sweeper.collect_expired(), vec!["long".to_string()]);
    assert_eq!(sweeper.tracked(), 0);
}

#[test]
fn test_short_ttl_waits_for_tick() {
    let sweeper = TtlSweeper::new(Duration::from_secs(60));

    sweeper.mark("key", Duration::from_millis(1));

    // Nothing expires between ticks
    assert_eq!(sweeper.tracked(), 1);
    assert_eq!(sweeper.collect_expired(), vec!["key".to_string()]);
}

#[test]
fn test_zero_ttl_expires_on_first_tick() {
    let sweeper = TtlSweeper::new(Duration::from_secs(1));
    sweeper.mark("key", Duration::ZERO);

    assert_eq!(sweeper.collect_expired(), vec!["key".to_string()]);
}

// =============================================================================
// Tick Tests
// =============================================================================

#[test]
fn test_tick_erases_through_coordinator() {
    let (_temp, backend, coordinator) = setup_coordinator();
    let sweeper = TtlSweeper::new(Duration::from_secs(5));

    sweeper.mark("nba", Duration::from_secs(5));
    coordinator.set("nba", Bytes::from("value"), true).unwrap();
    coordinator.set("keep", Bytes::from("value"), true).unwrap();

    let expired = sweeper.tick(&coordinator);

    assert_eq!(expired, vec!["nba".to_string()]);
    assert_eq!(coordinator.get("nba").unwrap(), None);
    assert!(!backend.record_path("nba").exists());
    assert_eq!(coordinator.get("keep").unwrap(), Some(Bytes::from("value")));
}

#[test]
fn test_tick_on_unwritten_key() {
    let (_temp, _backend, coordinator) = setup_coordinator();
    let sweeper = TtlSweeper::new(Duration::from_secs(1));

    sweeper.mark("ghost", Duration::from_secs(1));

    assert_eq!(sweeper.tick(&coordinator), vec!["ghost".to_string()]);
}

#[test]
fn test_tick_swallows_erase_failures() {
    let coordinator =
        Coordinator::new(Arc::new(UndeletableBackend), Arc::new(MemoryCache::new())).unwrap();
    let sweeper = TtlSweeper::new(Duration::from_secs(1));

    coordinator.set("key", Bytes::from("value"), true).unwrap();
    sweeper.mark("key", Duration::from_secs(1));

    let expired = sweeper.tick(&coordinator);

    assert_eq!(expired, vec!["key".to_string()]);
    assert!(!coordinator.contains("key"));
    assert_eq!(sweeper.tracked(), 0);
}

// =============================================================================
// Background Loop Tests
// =============================================================================

#[test]
fn test_background_expiry() {
    let (_temp, backend, coordinator) = setup_coordinator();
    let sweeper = Arc::new(TtlSweeper::new(Duration::from_millis(20)));

    sweeper.mark("nba", Duration::from_millis(50));
    coordinator.set("nba", Bytes::from("value"), true).unwrap();

    let _handle = sweeper.run(Arc::clone(&coordinator)).unwrap();

    assert!(eventually(|| coordinator.get("nba").unwrap().is_none()));
    assert!(!backend.record_path("nba").exists());
}

#[test]
fn test_lifecycle_states() {
    let (_temp, _backend, coordinator) = setup_coordinator();
    let sweeper = Arc::new(TtlSweeper::new(Duration::from_millis(10)));

    assert_eq!(sweeper.state(), SweeperState::Idle);

    let handle = sweeper.run(Arc::clone(&coordinator)).unwrap();
    assert_eq!(sweeper.state(), SweeperState::Sweeping);
    assert!(sweeper.is_running());
    assert!(handle.is_running());

    handle.stop();
    assert_eq!(sweeper.state(), SweeperState::Stopped);
    assert!(!sweeper.is_running());
}

#[test]
fn test_double_run_rejected() {
    let (_temp, _backend, coordinator) = setup_coordinator();
    let sweeper = Arc::new(TtlSweeper::new(Duration::from_millis(10)));

    let _handle = sweeper.run(Arc::clone(&coordinator)).unwrap();

    assert!(matches!(
        sweeper.run(Arc::clone(&coordinator)),
        Err(KvError::Sweeper(_))
    ));
}

#[test]
fn test_no_restart_after_stop() {
    let (_temp, _backend, coordinator) = setup_coordinator();
    let sweeper = Arc::new(TtlSweeper::new(Duration::from_millis(10)));

    sweeper.run(Arc::clone(&coordinator)).unwrap().stop();

    assert!(sweeper.run(coordinator).is_err());
}

#[test]
fn test_dropped_handle_stops_ticking() {
    let (_temp, _backend, coordinator) = setup_coordinator();
    let sweeper = Arc::new(TtlSweeper::new(Duration::from_millis(10)));

    {
        let _handle = sweeper.run(Arc::clone(&coordinator)).unwrap();
        thread::sleep(Duration::from_millis(30));
    }

    coordinator.set("key", Bytes::from("value"), true).unwrap();
    sweeper.mark("key", Duration::ZERO);
    thread::sleep(Duration::from_millis(60));

    assert_eq!(sweeper.tracked(), 1);
    assert!(coordinator.contains("key"));
}
