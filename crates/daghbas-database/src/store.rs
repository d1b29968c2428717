//! Store and unit-of-work contracts.
//!
//! A unit of work is a scoped transaction. Everything written through it
//! becomes visible at [`UnitOfWork::commit`]; dropping it without a commit
//! discards every change.

use async_trait::async_trait;
use uuid::Uuid;

use daghbas_core::result::AppResult;
use daghbas_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use daghbas_entity::file::FileRecord;
use daghbas_entity::folder::Folder;
use daghbas_entity::installation::Installation;
use daghbas_entity::permission::PermissionGrant;

/// Handle to the persistent state, shared by all services.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug + 'static {
    /// Backend name for logging.
    fn backend(&self) -> &'static str;

    /// Open a new unit of work.
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}

/// Folder rows.
#[async_trait]
pub trait FolderStore: Send {
    /// Find a folder by ID.
    async fn find_folder(&mut self, id: Uuid) -> AppResult<Option<Folder>>;

    /// Find a folder and hold it against deletion until the unit ends.
    /// Several units may hold the same folder this way at once.
    async fn find_folder_for_share(&mut self, id: Uuid) -> AppResult<Option<Folder>>;

    /// Find a folder and hold it exclusively until the unit ends.
    async fn find_folder_for_update(&mut self, id: Uuid) -> AppResult<Option<Folder>>;

    /// All folders, ordered by name.
    async fn list_folders(&mut self) -> AppResult<Vec<Folder>>;

    /// Direct children of a folder, ordered by name.
    async fn list_child_folders(&mut self, parent_id: Uuid) -> AppResult<Vec<Folder>>;

    /// Insert a new folder.
    async fn insert_folder(&mut self, folder: &Folder) -> AppResult<()>;

    /// Delete a folder. Returns whether a row was removed.
    async fn delete_folder(&mut self, id: Uuid) -> AppResult<bool>;
}

/// File record rows.
#[async_trait]
pub trait FileStore: Send {
    /// Find a file by ID without locking it.
    async fn find_file(&mut self, id: Uuid) -> AppResult<Option<FileRecord>>;

    /// Find a file by ID and hold its row lock until the unit ends.
    async fn lock_file(&mut self, id: Uuid) -> AppResult<Option<FileRecord>>;

    /// Serialize every unit that touches `(folder_id, name)`, whether or
    /// not a record with that name exists yet.
    async fn lock_file_name(&mut self, folder_id: Uuid, name: &str) -> AppResult<()>;

    /// Find a file by exact, case-sensitive name within a folder.
    async fn find_file_by_name(
        &mut self,
        folder_id: Uuid,
        name: &str,
    ) -> AppResult<Option<FileRecord>>;

    /// Files in a folder, ordered by name.
    async fn list_files(&mut self, folder_id: Uuid) -> AppResult<Vec<FileRecord>>;

    /// Number of files in a folder.
    async fn count_files(&mut self, folder_id: Uuid) -> AppResult<i64>;

    /// Insert a new file record.
    async fn insert_file(&mut self, file: &FileRecord) -> AppResult<()>;

    /// Persist every mutable column of an existing record.
    async fn update_file(&mut self, file: &FileRecord) -> AppResult<()>;

    /// Delete a file record. Returns whether a row was removed.
    async fn delete_file(&mut self, id: Uuid) -> AppResult<bool>;
}

/// Permission grant rows.
#[async_trait]
pub trait GrantStore: Send {
    /// The grant row for `(user_id, folder_id)`, if any.
    async fn find_grant(
        &mut self,
        user_id: Uuid,
        folder_id: Uuid,
    ) -> AppResult<Option<PermissionGrant>>;

    /// Insert or replace the row for the grant's `(user_id, folder_id)`.
    async fn upsert_grant(&mut self, grant: &PermissionGrant) -> AppResult<PermissionGrant>;

    /// Remove the row for `(user_id, folder_id)`. Returns whether one existed.
    async fn delete_grant(&mut self, user_id: Uuid, folder_id: Uuid) -> AppResult<bool>;

    /// Grants on a folder.
    async fn list_grants_for_folder(&mut self, folder_id: Uuid)
    -> AppResult<Vec<PermissionGrant>>;
}

/// The append-only audit trail.
#[async_trait]
pub trait AuditStore: Send {
    /// Append one entry.
    async fn append_audit(&mut self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry>;

    /// Newest entries first.
    async fn recent_audit(&mut self, limit: i64) -> AppResult<Vec<AuditLogEntry>>;

    /// Entries for one target, newest first.
    async fn audit_for_target(
        &mut self,
        target_type: &str,
        target_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>>;
}

/// Device installation rows.
#[async_trait]
pub trait InstallationStore: Send {
    /// Serialize every unit that touches `device_id`.
    async fn lock_device(&mut self, device_id: &str) -> AppResult<()>;

    /// Find the installation for a device.
    async fn find_installation(&mut self, device_id: &str) -> AppResult<Option<Installation>>;

    /// Insert or replace the row for the installation's device.
    async fn upsert_installation(&mut self, installation: &Installation) -> AppResult<()>;
}

/// A scoped transaction over every table.
#[async_trait]
pub trait UnitOfWork: FolderStore + FileStore + GrantStore + AuditStore + InstallationStore {
    /// Make every change in this unit visible at once.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
