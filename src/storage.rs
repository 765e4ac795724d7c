//! Local stores for document content and generated images.
//!
//! Uses a two-level directory structure based on an identifier prefix for
//! filesystem efficiency: `{root}/{id[0..2]}/{id}.{extension}`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from blob store access.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("no stored content for file {0}")]
    NotFound(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Source of stored document bytes, keyed by an opaque file identifier.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, BlobStoreError>;
}

/// Blob store backed by the local filesystem.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Construct the storage path for a file id.
    pub fn blob_path(&self, file_id: &str) -> PathBuf {
        let prefix = file_id.get(..2).unwrap_or(file_id);
        self.root.join(prefix).join(format!("{file_id}.txt"))
    }

    /// Save content under a newly assigned file id and return the id.
    pub fn save(&self, content: &[u8]) -> io::Result<String> {
        let file_id = uuid::Uuid::new_v4().to_string();
        let path = self.blob_path(&file_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        tracing::info!("stored {} bytes as file {}", content.len(), file_id);
        Ok(file_id)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, BlobStoreError> {
        let path = self.blob_path(file_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(BlobStoreError::NotFound(file_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Store for generated word-cloud images.
///
/// Images are stored under a unique name, preserving the extension of the
/// requested file name; the returned locator is the stored file name.
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist image bytes and return the stored file name (locator).
    pub fn save(&self, content: &[u8], file_name: &str) -> io::Result<String> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.root.join(&stored_name), content)?;
        tracing::info!("saved image {} (original name: {})", stored_name, file_name);
        Ok(stored_name)
    }

    /// Resolve a locator back to a filesystem path.
    pub fn image_path(&self, locator: &str) -> PathBuf {
        self.root.join(locator)
    }
}
