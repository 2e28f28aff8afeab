use crate::storage::traits::{validate_blob_name, BlobStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process blob store
///
/// Keeps every saved blob in a map; useful for embedding the crawler without
/// touching disk and for tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    saves: Mutex<Vec<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current bytes stored under `name`
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.blobs.lock().ok()?.get(name).cloned()
    }

    /// Names passed to `save`, in call order (duplicates included)
    pub fn save_log(&self) -> Vec<String> {
        self.saves.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of distinct names stored
    pub fn len(&self) -> usize {
        self.blobs.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn save(&self, name: &str, bytes: Vec<u8>) -> StorageResult<()> {
        validate_blob_name(name)?;

        self.saves
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .push(name.to_string());
        self.blobs
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .insert(name.to_string(), bytes);
        Ok(())
    }
}
