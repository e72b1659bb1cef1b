use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use rocksdb::{IteratorMode, DB};

use crate::storage::{Storage, StorageError};

/// RocksDB storage implementation
pub struct RocksDBStorage {
    db: DB,
    // Serializes insert-if-absent writers; plain gets and puts go straight
    // to RocksDB.
    write_lock: Mutex<()>,
}

impl RocksDBStorage {
    /// Create a new RocksDB storage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RocksDB database
    ///
    /// # Returns
    ///
    /// * `Result<Self, StorageError>` - The new instance
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        // Ensure the directory exists
        std::fs::create_dir_all(&path).map_err(|e| {
            StorageError::StorageError(format!("Failed to create DB directory: {e}"))
        })?;

        let mut options = rocksdb::Options::default();
        options.create_if_missing(true);
        options.create_missing_column_families(true);

        // Durability and performance options
        options.set_use_fsync(true);
        options.set_atomic_flush(true);
        options.set_keep_log_file_num(10);
        options.set_write_buffer_size(64 * 1024 * 1024);
        options.set_max_write_buffer_number(3);

        let db = DB::open(&options, path)
            .map_err(|e| StorageError::StorageError(format!("Failed to open RocksDB: {e}")))?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }
}

impl Drop for RocksDBStorage {
    fn drop(&mut self) {
        // Ensure all writes are flushed before closing
        let _ = self.db.flush();
    }
}

#[async_trait]
impl Storage for RocksDBStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.db
            .get(key.as_bytes())
            .map_err(|e| StorageError::StorageError(format!("Failed to get key: {e}")))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.db
            .put(key.as_bytes(), value)
            .map_err(|e| StorageError::StorageError(format!("Failed to set key: {e}")))
    }

    async fn set_if_absent(&self, key: &str, value: &[u8]) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock();

        let existing = self
            .db
            .get(key.as_bytes())
            .map_err(|e| StorageError::StorageError(format!("Failed to get key: {e}")))?;
        if existing.is_some() {
            return Ok(false);
        }

        self.db
            .put(key.as_bytes(), value)
            .map_err(|e| StorageError::StorageError(format!("Failed to set key: {e}")))?;
        Ok(true)
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.db
            .get(key.as_bytes())
            .map(|v| v.is_some())
            .map_err(|e| StorageError::StorageError(format!("Failed to check key existence: {e}")))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let prefix_bytes = prefix.as_bytes();
        let iter = self.db.iterator(IteratorMode::From(
            prefix_bytes,
            rocksdb::Direction::Forward,
        ));

        let mut keys = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| {
                StorageError::StorageError(format!("Failed to iterate over keys: {e}"))
            })?;

            let key_str = String::from_utf8_lossy(&key).to_string();

            // Keys are ordered; once we've moved past the prefix we can stop
            if key_str.starts_with(prefix) {
                keys.push(key_str);
            } else {
                break;
            }
        }

        Ok(keys)
    }
}
