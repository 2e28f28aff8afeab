//! Filesystem blob store
//!
//! Downloads land flat in one directory, the way the web application serves
//! them from its public storage folder.

use crate::crawler::FILE_EXTENSIONS;
use crate::storage::traits::{validate_blob_name, BlobStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Blob store writing each blob to `<root>/<name>`
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Opens the store, creating `root` if it does not exist
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory blobs are written to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists stored spreadsheet documents, sorted by name
    ///
    /// A file qualifies when its extension (case-sensitive) is one of the
    /// crawled spreadsheet extensions.
    pub fn list_spreadsheets(&self) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let path = entry.path();
            let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };

            if FILE_EXTENSIONS
                .iter()
                .any(|known| known.trim_start_matches('.') == extension)
            {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn save(&self, name: &str, bytes: Vec<u8>) -> StorageResult<()> {
        validate_blob_name(name)?;

        let path = self.root.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Write {
                name: name.to_string(),
                source,
            })?;

        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }
}
