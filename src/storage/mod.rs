//! Storage module for persisting downloaded documents
//!
//! The crawler treats storage as an opaque blob store keyed by file name:
//! - `FsBlobStore` writes into the configured download directory
//! - `MemoryBlobStore` keeps blobs in process

mod fs;
mod memory;
mod traits;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use traits::{validate_blob_name, BlobStore, StorageError, StorageResult};
