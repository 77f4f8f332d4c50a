//! Durable storage for the serialized ledger.

use crate::error::Res;
use crate::utils;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::trace;

/// A single durable slot holding the whole serialized ledger. Every write replaces the previous
/// contents entirely.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Returns the stored contents, or `None` if nothing has been stored yet.
    async fn read(&self) -> Res<Option<String>>;

    /// Overwrites the stored contents.
    async fn write(&self, contents: &str) -> Res<()>;
}

/// Stores the ledger as a JSON file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|s| s.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl Storage for FileStorage {
    async fn read(&self) -> Res<Option<String>> {
        trace!("Reading ledger from {}", self.path.display());
        utils::read_optional(&self.path).await
    }

    async fn write(&self, contents: &str) -> Res<()> {
        trace!("Writing ledger to {}", self.path.display());
        // Write beside the target and move it into place so a crash never leaves a half file.
        let tmp = self.tmp_path();
        utils::write(&tmp, contents).await?;
        utils::rename(&tmp, &self.path).await
    }
}

/// Keeps the serialized ledger in memory. Clones share the same slot, which lets a test hold on
/// to one handle and inspect what the ledger wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage slot that already holds `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            data: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    pub async fn contents(&self) -> Option<String> {
        self.data.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn read(&self) -> Res<Option<String>> {
        Ok(self.data.lock().await.clone())
    }

    async fn write(&self, contents: &str) -> Res<()> {
        *self.data.lock().await = Some(contents.to_string());
        Ok(())
    }
}
