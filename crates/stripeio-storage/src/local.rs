//! Local filesystem endpoint
//!
//! Stores each volume as a directory under a root and each part path as a
//! file inside its volume. Names are validated before any filesystem
//! operation runs.

use crate::endpoint::StorageEndpoint;
use async_trait::async_trait;
use std::path::PathBuf;
use stripeio_common::{PartPath, Result, VolumeName};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Filesystem-backed storage endpoint rooted at a directory
pub struct LocalEndpoint {
    root: PathBuf,
}

impl LocalEndpoint {
    /// Create an endpoint over `root`; the directory is created lazily
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this endpoint
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn volume_dir(&self, volume: &str) -> Result<PathBuf> {
        let volume = VolumeName::new(volume)?;
        Ok(self.root.join(volume.as_str()))
    }

    fn file_path(&self, volume: &str, path: &str) -> Result<PathBuf> {
        let part = PartPath::new(path)?;
        Ok(self.volume_dir(volume)?.join(part.as_str()))
    }
}

#[async_trait]
impl StorageEndpoint for LocalEndpoint {
    async fn append(&self, volume: &str, path: &str, data: &[u8]) -> Result<()> {
        let file_path = self.file_path(volume, path)?;
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&file_path)
            .await?;
        file.write_all(data).await?;
        Ok(())
    }

    async fn make_volume(&self, volume: &str) -> Result<()> {
        fs::create_dir_all(self.volume_dir(volume)?).await?;
        Ok(())
    }

    async fn delete_volume(&self, volume: &str) -> Result<()> {
        match fs::remove_dir_all(self.volume_dir(volume)?).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn read_file(&self, volume: &str, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.file_path(volume, path)?).await?)
    }
}
