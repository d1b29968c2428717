//! File record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file tracked by the versioning engine.
///
/// The lock holder and lock timestamp are either both set or both empty;
/// they only change through [`FileRecord::lock`] and [`FileRecord::unlock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    /// Unique file identifier.
    pub id: Uuid,
    /// The folder containing this file.
    pub folder_id: Uuid,
    /// Opaque handle into the blob store. Globally unique, never reused.
    pub stored_name: String,
    /// The user-visible name, unique within its folder.
    pub original_name: String,
    /// Monotonic version number starting at 1.
    pub version: i32,
    /// Size of the last successfully written payload.
    pub size_bytes: i64,
    /// SHA-256 of the last successfully written payload.
    pub checksum_sha256: Option<String>,
    /// The principal who created the file.
    pub created_by: Uuid,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last written or moved.
    pub updated_at: DateTime<Utc>,
    /// The principal holding the edit lock, if any.
    pub locked_by: Option<Uuid>,
    /// When the current lock was taken.
    pub locked_at: Option<DateTime<Utc>>,
}

/// Lock state of a file, derived from its lock holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "holder", rename_all = "snake_case")]
pub enum LockState {
    /// Nobody holds the lock.
    Unlocked,
    /// The given principal holds the lock.
    LockedBy(Uuid),
}

impl FileRecord {
    /// Current lock state.
    pub fn lock_state(&self) -> LockState {
        match self.locked_by {
            Some(holder) => LockState::LockedBy(holder),
            None => LockState::Unlocked,
        }
    }

    /// Check if the file is currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked_by.is_some()
    }

    /// Check if the file is locked by someone other than `user_id`.
    pub fn is_locked_by_other(&self, user_id: Uuid) -> bool {
        matches!(self.locked_by, Some(holder) if holder != user_id)
    }

    /// Set the lock holder and lock time together.
    pub fn lock(&mut self, holder: Uuid, at: DateTime<Utc>) {
        self.locked_by = Some(holder);
        self.locked_at = Some(at);
    }

    /// Clear the lock holder and lock time together.
    pub fn unlock(&mut self) {
        self.locked_by = None;
        self.locked_at = None;
    }

    /// Record a new payload: bump the version by one and refresh size, checksum and timestamp.
    pub fn record_write(&mut self, size_bytes: i64, checksum_sha256: String, at: DateTime<Utc>) {
        self.version += 1;
        self.size_bytes = size_bytes;
        self.checksum_sha256 = Some(checksum_sha256);
        self.updated_at = at;
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.original_name)
    }
}

/// Extract the lowercase extension of a display name, if any.
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .map(|(_, ext)| ext.to_lowercase())
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFileRecord {
    /// The folder to place the file in.
    pub folder_id: Uuid,
    /// The freshly allocated stored-name.
    pub stored_name: String,
    /// The user-visible name.
    pub original_name: String,
    /// Payload size in bytes.
    pub size_bytes: i64,
    /// Payload SHA-256.
    pub checksum_sha256: String,
    /// The creating principal.
    pub created_by: Uuid,
}

impl CreateFileRecord {
    /// Materialize the row that gets stored: version 1, unlocked.
    pub fn into_record(self) -> FileRecord {
        let now = Utc::now();
        FileRecord {
            id: Uuid::now_v7(),
            folder_id: self.folder_id,
            stored_name: self.stored_name,
            original_name: self.original_name,
            version: 1,
            size_bytes: self.size_bytes,
            checksum_sha256: Some(self.checksum_sha256),
            created_by: self.created_by,
            created_at: now,
            updated_at: now,
            locked_by: None,
            locked_at: None,
        }
    }
}
