//! Serialization codecs
//!
//! Both codecs refuse to produce or consume an empty payload, so an absent
//! value can never be stored and later mistaken for a real one.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{KvError, Result};

/// Turns typed values into bytes and back
pub trait Codec: Send + Sync {
    /// Serialize `value`; fails with [`KvError::Encoding`] if it is empty/nil
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserialize `bytes`; fails with [`KvError::Encoding`] if they are empty
    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON codec (default)
///
/// A value that encodes to `null` (`None`, `()`) counts as nil.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let bytes = serde_json::to_vec(value).map_err(|e| KvError::Encoding(e.to_string()))?;
        if bytes == b"null" {
            return Err(KvError::Encoding("nil value".into()));
        }
        Ok(bytes)
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        if bytes.is_empty() {
            return Err(KvError::Encoding("empty payload".into()));
        }
        serde_json::from_slice(bytes).map_err(|e| KvError::Encoding(e.to_string()))
    }
}

/// Bincode codec
///
/// Only values with a zero-length encoding (`()`, unit structs) count as nil.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let bytes = bincode::serialize(value).map_err(|e| KvError::Encoding(e.to_string()))?;
        if bytes.is_empty() {
            return Err(KvError::Encoding("nil value".into()));
        }
        Ok(bytes)
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        if bytes.is_empty() {
            return Err(KvError::Encoding("empty payload".into()));
        }
        bincode::deserialize(bytes).map_err(|e| KvError::Encoding(e.to_string()))
    }
}
