//! Audit log entry entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use daghbas_core::error::AppError;

/// An immutable audit log entry recording an accepted mutation.
///
/// Entries are appended once and never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The principal who performed the action.
    pub actor_id: Uuid,
    /// The action tag (e.g., `"upload"`, `"save_in_place"`).
    pub action: String,
    /// The type of target entity (e.g., `"file"`, `"folder"`).
    pub target_type: String,
    /// The target entity ID.
    pub target_id: String,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    /// The principal who performed the action.
    pub actor_id: Uuid,
    /// The action performed.
    pub action: AuditAction,
    /// Target entity type.
    pub target_type: TargetType,
    /// Target entity ID.
    pub target_id: String,
}

impl CreateAuditLogEntry {
    /// Build an entry for an action on a file.
    pub fn file(actor_id: Uuid, action: AuditAction, file_id: Uuid) -> Self {
        Self {
            actor_id,
            action,
            target_type: TargetType::File,
            target_id: file_id.to_string(),
        }
    }

    /// Build an entry for an action on a folder.
    pub fn folder(actor_id: Uuid, action: AuditAction, folder_id: Uuid) -> Self {
        Self {
            actor_id,
            action,
            target_type: TargetType::Folder,
            target_id: folder_id.to_string(),
        }
    }

    /// Materialize the row that gets stored.
    pub fn into_entry(self) -> AuditLogEntry {
        AuditLogEntry {
            id: Uuid::now_v7(),
            actor_id: self.actor_id,
            action: self.action.as_str().to_string(),
            target_type: self.target_type.as_str().to_string(),
            target_id: self.target_id,
            created_at: Utc::now(),
        }
    }
}

/// Action tags recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A new file record was created.
    Upload,
    /// An existing file's bytes were replaced and its version bumped.
    SaveInPlace,
    /// A file lock was taken.
    Lock,
    /// A file lock was released.
    Unlock,
    /// A file was moved to another folder.
    Move,
    /// A file was deleted.
    Delete,
    /// A file was downloaded.
    Download,
    /// A folder was created.
    FolderCreate,
    /// A folder was deleted.
    FolderDelete,
    /// A folder grant was created or changed.
    PermissionGrant,
    /// A folder grant was removed.
    PermissionRevoke,
}

impl AuditAction {
    /// Return the stored tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::SaveInPlace => "save_in_place",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Move => "move",
            Self::Delete => "delete",
            Self::Download => "download",
            Self::FolderCreate => "folder_create",
            Self::FolderDelete => "folder_delete",
            Self::PermissionGrant => "permission_grant",
            Self::PermissionRevoke => "permission_revoke",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of entity an audit entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// A file record.
    File,
    /// A folder.
    Folder,
}

impl TargetType {
    /// Return the stored tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "folder" => Ok(Self::Folder),
            other => Err(AppError::validation(format!("Unknown target type: {other}"))),
        }
    }
}
