//! Codec Module
//!
//! Value ↔ record transforms applied above the coordinator.
//!
//! ## Pipeline
//! ```text
//! set:  value ──serialize──▶ bytes ──compress──▶ record ──▶ Coordinator
//! get:  Coordinator ──▶ record ──decompress──▶ bytes ──deserialize──▶ value
//! ```
//!
//! The coordinator never looks inside a record; both halves of the pipeline
//! are injected into the [`Store`](crate::Store).

mod compression;
mod serial;

pub use compression::{compressor_for, Compressor, Lz4Compression, NoCompression};
pub use serial::{BincodeCodec, Codec, JsonCodec};
