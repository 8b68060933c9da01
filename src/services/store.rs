//! Key-value storage backends for per-user log partitions
//!
//! `FileStore` keeps one JSON file per key under the data directory
//! (`~/.healthlog/healthLogs_<user>.json`). Writes go to a temp file that
//! is renamed over the target, so a failed write never clobbers the
//! previous value.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::types::{HealthLogError, Result};

/// Durable string values addressed by key
pub trait KeyValueStore {
    /// Stored value, or None when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value for `key`; on error the previous value is retained
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One file per key in a data directory
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key.contains(&['/', '\\'][..])
            || key.starts_with('.')
            || key.contains("..")
        {
            return Err(HealthLogError::Validation(format!(
                "invalid storage key: {:?}",
                key
            )));
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    /// Reads under a shared lock.
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path).map_err(|e| {
            HealthLogError::StorageRead(format!("Failed to open {}: {}", path.display(), e))
        })?;

        file.lock_shared().map_err(|e| {
            HealthLogError::StorageRead(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut content = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut content);
        let _ = file.unlock();

        read.map_err(|e| {
            HealthLogError::StorageRead(format!("Failed to read {}: {}", path.display(), e))
        })?;

        tracing::debug!(key, bytes = content.len(), "read partition");
        Ok(Some(content))
    }

    /// Atomic write (temp file + rename) with exclusive lock.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            HealthLogError::StorageWrite(format!("Failed to create data dir: {}", e))
        })?;

        let temp_path = path.with_extension("json.tmp");
        if let Err(e) = write_temp(&temp_path, value) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        let existed = path.exists();
        let target = match OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(HealthLogError::StorageWrite(format!(
                    "Failed to open target: {}",
                    e
                )));
            }
        };

        if let Err(e) = target.lock_exclusive() {
            let _ = fs::remove_file(&temp_path);
            if !existed {
                let _ = fs::remove_file(&path);
            }
            return Err(HealthLogError::StorageWrite(format!(
                "Failed to acquire write lock: {}",
                e
            )));
        }

        let renamed = fs::rename(&temp_path, &path);
        let _ = target.unlock();

        if let Err(e) = renamed {
            let _ = fs::remove_file(&temp_path);
            // a placeholder left by the lock would read as a corrupt partition
            if !existed {
                let _ = fs::remove_file(&path);
            }
            return Err(HealthLogError::StorageWrite(format!(
                "Failed to rename temp file: {}",
                e
            )));
        }

        tracing::debug!(key, bytes = value.len(), "wrote partition");
        Ok(())
    }
}

fn write_temp(temp_path: &Path, value: &str) -> Result<()> {
    let mut file = File::create(temp_path).map_err(|e| {
        HealthLogError::StorageWrite(format!("Failed to create temp file: {}", e))
    })?;
    file.write_all(value.as_bytes()).map_err(|e| {
        HealthLogError::StorageWrite(format!("Failed to write temp file: {}", e))
    })?;
    file.sync_all().map_err(|e| {
        HealthLogError::StorageWrite(format!("Failed to sync temp file: {}", e))
    })?;
    Ok(())
}

/// In-process store for tests and benches
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
