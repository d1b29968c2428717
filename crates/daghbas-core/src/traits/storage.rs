//! Blob store trait for pluggable payload storage backends.
//!
//! Payloads are addressed by an opaque stored-name that is unrelated to
//! the user-visible display name of the file.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Datelike, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::result::AppResult;

/// A byte stream type used for reading payloads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for blob storage backends.
///
/// Implementations must write a payload completely or not at all, and a
/// payload written under a stored-name must be readable by that name
/// afterwards.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read a payload and return its byte stream.
    ///
    /// Fails with `NotFound` when nothing is stored under `name`.
    async fn read(&self, name: &str) -> AppResult<ByteStream>;

    /// Read a payload into memory.
    async fn read_bytes(&self, name: &str) -> AppResult<Bytes>;

    /// Write (or overwrite) the payload stored under `name`.
    async fn write(&self, name: &str, data: Bytes) -> AppResult<()>;

    /// Delete the payload stored under `name`. Deleting a missing payload succeeds.
    async fn delete(&self, name: &str) -> AppResult<()>;

    /// Check whether a payload is stored under `name`.
    async fn exists(&self, name: &str) -> AppResult<bool>;

    /// Mint a fresh, collision-free stored-name.
    ///
    /// Names are bucketed by year (`2026/<uuid>.docx`) and never derived
    /// from the display name.
    fn allocate_unique_name(&self, extension: Option<&str>) -> String {
        allocate_stored_name(Utc::now().year(), extension)
    }
}

/// Build a stored-name of the form `<year>/<uuid-v4><.ext>`.
pub fn allocate_stored_name(year: i32, extension: Option<&str>) -> String {
    let ext = extension
        .map(|e| e.trim_start_matches('.'))
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{year}/{}{ext}", Uuid::new_v4())
}
