//! Error types for AsideKV
//!
//! Provides a unified error type for all operations.
//!
//! "Not found" is never an error: lookups return `Ok(None)` for keys that
//! have no durable record. A failed read of a key that *is* durable surfaces
//! as [`KvError::BackendRead`], so the two cases never collapse into one.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for AsideKV operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Persistent Backend Errors
    // -------------------------------------------------------------------------
    #[error("Persistent write failed for key '{key}': {source}")]
    BackendWrite {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Persistent read failed for durable key '{key}': {source}")]
    BackendRead {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Erase failed for key '{key}': {reason}")]
    Erase { key: String, reason: String },

    #[error("Invalid key {0:?}")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Cache Errors
    // -------------------------------------------------------------------------
    #[error("Cache error: {0}")]
    Cache(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Compression error: {0}")]
    Compression(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Background Task Errors
    // -------------------------------------------------------------------------
    #[error("Sweeper error: {0}")]
    Sweeper(String),
}

impl KvError {
    /// True for failures that mean a durable record is missing or unreadable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, KvError::BackendRead { .. })
    }
}
