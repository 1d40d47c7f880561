//! Persistent Module
//!
//! Durable tier of the store.
//!
//! ## Responsibilities
//! - Hold one logical record per key
//! - Overwrite a record wholesale on every write (never append)
//! - List existing records so the durability set can be rebuilt on open
//!
//! ## File Layout
//! ```text
//! {data_dir}/
//!   ├── <key>.<extension>    raw record bytes, no header, no checksum
//!   └── ...                  the file name is the only index
//! ```

mod file;

use crate::error::{KvError, Result};

pub use file::FileBackend;

/// Durable key → bytes mapping
///
/// Every call is atomic from the caller's point of view; the caller never
/// holds a backend lock across calls.
pub trait PersistentBackend: Send + Sync {
    /// Durably overwrite the record for `key`
    fn store(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Read the record for `key`
    ///
    /// Callers only read keys they believe are durable, so a missing record
    /// is reported as [`KvError::BackendRead`], not as a miss.
    fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Delete the record for `key`; deleting a missing record succeeds
    fn delete(&self, key: &str) -> Result<()>;

    /// Keys of every record currently held
    fn keys(&self) -> Result<Vec<String>>;
}

/// Check that a key can be used as a file stem
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key == "." || key == ".." {
        return Err(KvError::InvalidKey(key.to_string()));
    }
    if key.contains(['/', '\\', '\0']) {
        return Err(KvError::InvalidKey(key.to_string()));
    }
    Ok(())
}
