//! MemoryCache Tests
//!
//! Tests verify:
//! - Basic set/get/contains/erase
//! - Size tracking
//! - insert_if_absent semantics
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use asidekv::cache::{CacheBackend, MemoryCache};
use bytes::Bytes;

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_cache_is_empty() {
    let cache = MemoryCache::new();
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.size(), 0);
    assert!(cache.is_empty());
}

#[test]
fn test_set_and_get() {
    let cache = MemoryCache::new();

    cache.set("key1", Bytes::from_static(b"value1")).unwrap();

    assert_eq!(cache.get("key1"), Some(Bytes::from_static(b"value1")));
    assert!(cache.contains("key1"));
}

#[test]
fn test_get_nonexistent_key() {
    let cache = MemoryCache::new();

    assert_eq!(cache.get("nonexistent"), None);
    assert!(!cache.contains("nonexistent"));
}

#[test]
fn test_set_overwrites_existing() {
    let cache = MemoryCache::new();

    cache.set("key1", Bytes::from_static(b"value1")).unwrap();
    cache.set("key1", Bytes::from_static(b"value2")).unwrap();

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("key1"), Some(Bytes::from_static(b"value2")));
}

#[test]
fn test_erase_removes_key() {
    let cache = MemoryCache::new();

    cache.set("key1", Bytes::from_static(b"value1")).unwrap();
    cache.erase("key1").unwrap();

    assert!(!cache.contains("key1"));
    assert!(cache.is_empty());
}

#[test]
fn test_erase_nonexistent_key_is_ok() {
    let cache = MemoryCache::new();
    assert!(cache.erase("nonexistent").is_ok());
}

#[test]
fn test_clear() {
    let cache = MemoryCache::new();

    for i in 0..10 {
        cache.set(&format!("key{}", i), Bytes::from("v")).unwrap();
    }
    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.size(), 0);
}

// =============================================================================
// Size Tracking Tests
// =============================================================================

#[test]
fn test_size_tracking_set() {
    let cache = MemoryCache::new();

    cache.set("key", Bytes::from_static(b"value")).unwrap();

    assert_eq!(cache.size(), "key".len() + "value".len());
}

#[test]
fn test_size_tracking_overwrite() {
    let cache = MemoryCache::new();

    cache.set("key", Bytes::from_static(b"short")).unwrap();
    cache.set("key", Bytes::from_static(b"much_longer_value")).unwrap();

    assert_eq!(cache.size(), "key".len() + "much_longer_value".len());
}

#[test]
fn test_size_tracking_erase() {
    let cache = MemoryCache::new();

    cache.set("a", Bytes::from_static(b"1")).unwrap();
    cache.set("bb", Bytes::from_static(b"22")).unwrap();
    cache.erase("a").unwrap();

    assert_eq!(cache.size(), 4);
}

// =============================================================================
// insert_if_absent Tests
// =============================================================================

#[test]
fn test_insert_if_absent_inserts_new_key() {
    let cache = MemoryCache::new();

    let inserted = cache.insert_if_absent("key", Bytes::from_static(b"v1")).unwrap();

    assert!(inserted);
    assert_eq!(cache.get("key"), Some(Bytes::from_static(b"v1")));
}

#[test]
fn test_insert_if_absent_keeps_existing_value() {
    let cache = MemoryCache::new();
    cache.set("key", Bytes::from_static(b"newer")).unwrap();

    let inserted = cache.insert_if_absent("key", Bytes::from_static(b"older")).unwrap();

    assert!(!inserted);
    assert_eq!(cache.get("key"), Some(Bytes::from_static(b"newer")));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_readers_and_writer() {
    let cache = Arc::new(MemoryCache::new());
    for i in 0..100 {
        cache.set(&format!("key{}", i), Bytes::from(format!("value{}", i))).unwrap();
    }

    let mut handles = vec![];
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let value = cache.get(&format!("key{}", i)).unwrap();
                assert_eq!(value, Bytes::from(format!("value{}", i)));
            }
        }));
    }

    let writer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 100..200 {
                cache.set(&format!("key{}", i), Bytes::from("late")).unwrap();
            }
        })
    };

    for handle in handles {
        handle.join().unwrap();
    }
    writer.join().unwrap();

    assert_eq!(cache.len(), 200);
}
