//! Local filesystem storage provider.
//!
//! Writes go to a temporary sibling file that is flushed, synced and then
//! renamed over the target, so a reader sees either the old payload or the
//! new one and never a torn write.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use uuid::Uuid;

use daghbas_core::error::{AppError, ErrorKind};
use daghbas_core::result::AppResult;
use daghbas_core::traits::storage::{ByteStream, StorageProvider};

/// Local filesystem storage provider.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored payloads.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Root directory of this provider.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored-name to a path inside the root.
    ///
    /// Only plain relative components are accepted.
    fn resolve(&self, name: &str) -> AppResult<PathBuf> {
        let relative = Path::new(name.trim_start_matches('/'));
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if name.is_empty() || !plain {
            return Err(AppError::validation(format!("Invalid stored name: {name}")));
        }
        Ok(self.root.join(relative))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    async fn write_temp(temp: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(temp).await?;
        file.write_all(data).await?;
        file.flush().await?;
        file.sync_all().await
    }
}

fn not_found_or_storage(name: &str, action: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Blob not found: {name}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action}: {name}"), e)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn read(&self, name: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(name)?;
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| not_found_or_storage(name, "open blob", e))?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|chunk| chunk.map(Bytes::from))))
    }

    async fn read_bytes(&self, name: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(name)?;
        let data = fs::read(&full_path)
            .await
            .map_err(|e| not_found_or_storage(name, "read blob", e))?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, name: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(name)?;
        self.ensure_parent(&full_path).await?;

        let mut temp_name = full_path.as_os_str().to_owned();
        temp_name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        let temp_path = PathBuf::from(temp_name);

        let written = match Self::write_temp(&temp_path, &data).await {
            Ok(()) => fs::rename(&temp_path, &full_path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(name, error = %cleanup, "Failed to remove temporary blob");
                }
            }
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write blob: {name}"),
                e,
            ));
        }

        debug!(name, bytes = data.len(), "Wrote blob");
        Ok(())
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        let full_path = self.resolve(name)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(name, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(name, "Blob already absent");
                Ok(())
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob: {name}"),
                e,
            )),
        }
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        let full_path = self.resolve(name)?;
        fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat blob: {name}"),
                e,
            )
        })
    }
}
