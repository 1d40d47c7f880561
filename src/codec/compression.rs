//! Compressors
//!
//! Byte-level transforms applied after serialization.

use crate::config::CompressionKind;
use crate::error::{KvError, Result};

/// Compresses encoded values before they are stored
pub trait Compressor: Send + Sync {
    fn compress(&self, data: &[u8]) -> Vec<u8>;

    /// Reverse [`compress`](Compressor::compress); fails on a corrupt payload
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Identity transform (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompression;

impl Compressor for NoCompression {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        data.to_vec()
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// LZ4 block compression, original size prepended
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Compression;

impl Compressor for Lz4Compression {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        lz4_flex::compress_prepend_size(data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        lz4_flex::decompress_size_prepended(data).map_err(|e| KvError::Compression(e.to_string()))
    }
}

/// Build the compressor selected in config
pub fn compressor_for(kind: CompressionKind) -> Box<dyn Compressor> {
    match kind {
        CompressionKind::None => Box::new(NoCompression),
        CompressionKind::Lz4 => Box::new(Lz4Compression),
    }
}
