use std::sync::Arc;

use crate::storage::{
    deserialize, models::prefixes, serialize, KeyRecord, Storage, StorageError,
};

/// KeyStore handles the domain-specific key persistence operations
/// using an underlying storage implementation
#[derive(Clone)]
pub struct KeyStore {
    storage: Arc<dyn Storage>,
}

impl KeyStore {
    /// Create a new KeyStore with the given storage backend
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Insert a freshly issued key record
    ///
    /// Inserting a key that already exists never overwrites the existing
    /// record; it returns [`StorageError::UniqueViolation`] instead.
    pub async fn insert_key(&self, record: &KeyRecord) -> Result<(), StorageError> {
        let key = format!("{}{}", prefixes::ACCESS_KEY, record.key);
        let value = serialize(record)?;

        if !self.storage.set_if_absent(&key, &value).await? {
            return Err(StorageError::UniqueViolation);
        }

        Ok(())
    }

    /// Find a key record by the exact key string
    pub async fn find_by_key(&self, key: &str) -> Result<Option<KeyRecord>, StorageError> {
        let storage_key = format!("{}{}", prefixes::ACCESS_KEY, key);
        match self.storage.get(&storage_key).await? {
            Some(data) => Ok(Some(deserialize(&data)?)),
            None => Ok(None),
        }
    }
}
