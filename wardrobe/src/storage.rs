//! Storage backends for accepted uploads.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Trait for upload storage backends
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Create whatever the backend needs before the first write. Must be idempotent.
    async fn prepare(&self) -> io::Result<()>;

    /// Persist `content` under `name`. Never overwrites an existing entry.
    async fn store(&self, name: &str, content: &[u8]) -> io::Result<()>;

    /// Check whether an entry called `name` exists
    async fn exists(&self, name: &str) -> io::Result<bool>;
}

// ============================================================================
// Local Filesystem Storage Implementation
// ============================================================================

/// Local filesystem storage backend - stores files flat in a single directory
pub struct LocalFileStorage {
    base_path: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve `name` inside the base directory, refusing anything that is not a plain file name.
    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let plain = !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\']);
        if !plain {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("storage name '{name}' is not a plain file name"),
            ));
        }
        Ok(self.base_path.join(name))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(&self.base_path).await
    }

    async fn store(&self, name: &str, content: &[u8]) -> io::Result<()> {
        let full_path = self.resolve(name)?;

        let mut file = fs::OpenOptions::new().write(true).create_new(true).open(&full_path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;

        tracing::debug!(path = %full_path.display(), bytes = content.len(), "Stored upload");
        Ok(())
    }

    async fn exists(&self, name: &str) -> io::Result<bool> {
        let full_path = self.resolve(name)?;
        fs::try_exists(&full_path).await
    }
}
