use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};

/// Storage for blob-backed document payloads.
///
/// The core only records logical names; streaming bytes back out is left to
/// whoever holds the path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write (or overwrite) the blob called `name`.
    async fn write(&self, name: &str, bytes: &[u8]) -> StoreResult<()>;

    /// Streamable location of the blob called `name`.
    fn path(&self, name: &str) -> PathBuf;

    /// Remove the blob called `name`. Returns `true` if it existed.
    async fn remove(&self, name: &str) -> StoreResult<bool>;
}

/// Blob files stored flat under a root directory.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names must be a single, non-special path component.
    fn check_name(name: &str) -> StoreResult<()> {
        let bad = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);
        if bad {
            return Err(StoreError::InvalidBlobName(name.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write(&self, name: &str, bytes: &[u8]) -> StoreResult<()> {
        Self::check_name(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(name), bytes).await?;
        tracing::debug!(blob = name, size = bytes.len(), "blob written");
        Ok(())
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    async fn remove(&self, name: &str) -> StoreResult<bool> {
        Self::check_name(name)?;
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
