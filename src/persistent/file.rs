//! File Backend
//!
//! One file per key, overwritten in full on every write.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::{KvError, Result};

use super::{validate_key, PersistentBackend};

/// File-per-key persistent backend
///
/// ## Concurrency:
/// - Writes and deletes are serialized by `write_lock`
/// - Reads take no lock; the coordinator already excludes writers while reading
pub struct FileBackend {
    /// Directory where record files live
    data_dir: PathBuf,

    /// Record file extension, without the dot
    extension: String,

    /// fsync after every overwrite
    sync_writes: bool,

    /// Serializes store/delete
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Open or create a backend rooted at `path`
    pub fn open(path: &Path, extension: &str, sync_writes: bool) -> Result<Self> {
        fs::create_dir_all(path)?;

        info!(
            data_dir = %path.display(),
            extension,
            sync_writes,
            "File backend opened"
        );

        Ok(Self {
            data_dir: path.to_path_buf(),
            extension: extension.to_string(),
            sync_writes,
            write_lock: Mutex::new(()),
        })
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the record file for `key`
    /// "nba" → "{data_dir}/nba.kv"
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", key, self.extension))
    }

    /// Parse a key back out of a record file name
    /// "nba.kv" → Some("nba")
    fn parse_key(&self, path: &Path) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        let key = name.strip_suffix(&self.extension)?.strip_suffix('.')?;
        validate_key(key).ok()?;
        Some(key.to_string())
    }
}

impl PersistentBackend for FileBackend {
    fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        validate_key(key)?;
        let path = self.record_path(key);
        let write_err = |source| KvError::BackendWrite {
            key: key.to_string(),
            source,
        };

        let _guard = self.write_lock.lock();

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(write_err)?;
        file.write_all(value).map_err(write_err)?;
        if self.sync_writes {
            file.sync_all().map_err(write_err)?;
        }

        debug!(key, bytes = value.len(), "Record written");
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;
        fs::read(self.record_path(key)).map_err(|source| KvError::BackendRead {
            key: key.to_string(),
            source,
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let _guard = self.write_lock.lock();

        match fs::remove_file(self.record_path(key)) {
            Ok(()) => {
                debug!(key, "Record deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(KvError::Erase {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let file_path = entry.path();

            if file_path.is_file() {
                if let Some(key) = self.parse_key(&file_path) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}
