//! # AsideKV
//!
//! A small embedded key-value store with:
//! - An in-memory cache tier in front of a file-per-key persistent tier
//! - Cache-aside reads and a durability set deciding what is visible
//! - Single-writer/multi-reader coordination across both tiers
//! - A background TTL sweeper that expires keys on a fixed tick
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                               │
//! │          (Codec + Compressor + Coordinator + Sweeper)        │
//! └─────────────────────┬───────────────────────┬───────────────┘
//!                       │                       │ erase expired
//! ┌─────────────────────▼───────────────────────┴───────────────┐
//! │                      Coordinator                             │
//! │           (RwLock over durability set, cache-aside)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐        ┌─────────────┐
//!   │ MemoryCache │◀─refill──│ FileBackend │        │ TtlSweeper  │
//!   │  (RwLock)   │          │ <key>.<ext> │        │  (ticker)   │
//!   └─────────────┘          └─────────────┘        └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use asidekv::{Config, Store};
//!
//! let store = Store::open(Config::builder().data_dir("./data").build()).unwrap();
//! store.set("greeting", "hello", true).unwrap();
//! let value: Option<String> = store.get("greeting").unwrap();
//! assert_eq!(value.as_deref(), Some("hello"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod cache;
pub mod persistent;
pub mod codec;
pub mod coordinator;
pub mod sweeper;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::{CompressionKind, Config};
pub use cache::{CacheBackend, MemoryCache};
pub use persistent::{FileBackend, PersistentBackend};
pub use codec::{BincodeCodec, Codec, Compressor, JsonCodec, Lz4Compression, NoCompression};
pub use coordinator::Coordinator;
pub use sweeper::{SweeperHandle, SweeperState, TtlSweeper};
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of AsideKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
