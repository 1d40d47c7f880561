//! Configuration for AsideKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{KvError, Result};

/// Default interval between TTL sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default extension for record files
pub const DEFAULT_FILE_EXTENSION: &str = "kv";

/// Main configuration for a Store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// Directory holding one record file per durable key
    ///   {data_dir}/
    ///     ├── alpha.kv
    ///     └── beta.kv
    pub data_dir: PathBuf,

    /// Extension appended to every record file (`<key>.<extension>`)
    pub file_extension: String,

    /// fsync each record after it is overwritten
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Codec Configuration
    // -------------------------------------------------------------------------
    /// Compression applied to encoded values before they reach the coordinator
    pub compression: CompressionKind,

    // -------------------------------------------------------------------------
    // TTL Configuration
    // -------------------------------------------------------------------------
    /// Fixed tick interval of the TTL sweeper
    pub sweep_interval: Duration,
}

/// Compression choice for a Store opened from config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionKind {
    /// Identity transform
    #[default]
    None,

    /// LZ4 block compression with the original size prepended
    Lz4,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./asidekv_data"),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            sync_writes: false,
            compression: CompressionKind::None,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval.is_zero() {
            return Err(KvError::Config("sweep_interval must be > 0".into()));
        }
        let ext = &self.file_extension;
        if ext.is_empty() {
            return Err(KvError::Config("file_extension must not be empty".into()));
        }
        if ext.contains(['.', '/', '\\', '\0']) {
            return Err(KvError::Config(format!(
                "file_extension {:?} must not contain '.', path separators or NUL",
                ext
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the record file extension (without the leading dot)
    pub fn file_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.file_extension = ext.into();
        self
    }

    /// fsync every durable write
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    /// Set the compression used by the store
    pub fn compression(mut self, kind: CompressionKind) -> Self {
        self.config.compression = kind;
        self
    }

    /// Set the TTL sweep interval
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
