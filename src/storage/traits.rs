//! Storage traits and error types
//!
//! This module defines the trait interface for blob store backends and the
//! associated error type.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while persisting a downloaded file
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid blob name: {0:?}")]
    InvalidName(String),

    #[error("IO error writing {name}: {source}")]
    Write {
        name: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blob store lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Opaque blob store keyed by file name
///
/// Saving under an existing name overwrites it (last write wins). The crawler
/// hands over the bytes and keeps no reference after `save` returns.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `name`
    ///
    /// `name` is a single path component; implementations reject anything
    /// that could escape their root.
    async fn save(&self, name: &str, bytes: Vec<u8>) -> StorageResult<()>;
}

/// Checks that a blob name is a plain file name
pub fn validate_blob_name(name: &str) -> StorageResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}
