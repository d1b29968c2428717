//! Lock, unlock, move and delete, plus read access to file records.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use daghbas_auth::acl::PermissionOracle;
use daghbas_auth::rbac::RbacEnforcer;
use daghbas_core::error::AppError;
use daghbas_core::result::AppResult;
use daghbas_core::traits::StorageProvider;
use daghbas_database::store::{Store, UnitOfWork};
use daghbas_entity::audit::{AuditAction, CreateAuditLogEntry};
use daghbas_entity::file::FileRecord;
use daghbas_entity::permission::Capability;
use daghbas_entity::user::Principal;

use super::guard::can_edit;
use crate::audit::AuditService;

/// Handles lock state, relocation and removal of file records.
#[derive(Debug, Clone)]
pub struct FileService {
    /// Store handle.
    store: Arc<dyn Store>,
    /// Blob store.
    storage: Arc<dyn StorageProvider>,
    /// Folder permission oracle.
    oracle: Arc<PermissionOracle>,
    /// RBAC enforcer.
    rbac: RbacEnforcer,
}

async fn load_for_update(uow: &mut dyn UnitOfWork, file_id: Uuid) -> AppResult<FileRecord> {
    uow.lock_file(file_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        store: Arc<dyn Store>,
        storage: Arc<dyn StorageProvider>,
        oracle: Arc<PermissionOracle>,
    ) -> Self {
        Self {
            store,
            storage,
            oracle,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Gets a single file record, enforcing read permission on its folder.
    pub async fn get_file(&self, principal: &Principal, file_id: Uuid) -> AppResult<FileRecord> {
        self.rbac.require_active(principal)?;
        let mut uow = self.store.begin().await?;
        let record = uow
            .find_file(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        self.oracle
            .require(uow.as_mut(), principal, record.folder_id, Capability::Read)
            .await?;
        Ok(record)
    }

    /// Lists the files in a folder, enforcing read permission.
    pub async fn list_files(
        &self,
        principal: &Principal,
        folder_id: Uuid,
    ) -> AppResult<Vec<FileRecord>> {
        self.rbac.require_active(principal)?;
        let mut uow = self.store.begin().await?;
        uow.find_folder(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        self.oracle
            .require(uow.as_mut(), principal, folder_id, Capability::Read)
            .await?;
        let files = uow.list_files(folder_id).await?;
        Ok(files)
    }

    /// Takes the edit lock.
    ///
    /// Idempotent for the current holder. Administrators may take a lock
    /// held by anyone; everyone else gets `Conflict`.
    pub async fn lock(&self, principal: &Principal, file_id: Uuid) -> AppResult<FileRecord> {
        self.rbac.require_active(principal)?;
        let mut uow = self.store.begin().await?;
        let mut record = load_for_update(uow.as_mut(), file_id).await?;
        self.oracle
            .require(uow.as_mut(), principal, record.folder_id, Capability::Write)
            .await?;

        if record.is_locked_by_other(principal.user_id) && !principal.is_admin() {
            warn!(
                user_id = %principal.user_id,
                file_id = %file_id,
                "Lock rejected: file locked by another user"
            );
            return Err(AppError::conflict("File locked by another user"));
        }

        if record.locked_by != Some(principal.user_id) {
            record.lock(principal.user_id, Utc::now());
            uow.update_file(&record).await?;
        }
        AuditService::record(
            uow.as_mut(),
            CreateAuditLogEntry::file(principal.user_id, AuditAction::Lock, file_id),
        )
        .await?;
        uow.commit().await?;

        info!(user_id = %principal.user_id, file_id = %file_id, "File locked");
        Ok(record)
    }

    /// Releases the edit lock.
    ///
    /// Allowed for the holder, for administrators, and on an already
    /// unlocked file. Anyone else gets `Forbidden`.
    pub async fn unlock(&self, principal: &Principal, file_id: Uuid) -> AppResult<FileRecord> {
        self.rbac.require_active(principal)?;
        let mut uow = self.store.begin().await?;
        let mut record = load_for_update(uow.as_mut(), file_id).await?;
        self.oracle
            .require(uow.as_mut(), principal, record.folder_id, Capability::Write)
            .await?;

        if record.is_locked_by_other(principal.user_id) && !principal.is_admin() {
            warn!(
                user_id = %principal.user_id,
                file_id = %file_id,
                "Unlock rejected: file locked by another user"
            );
            return Err(AppError::forbidden(
                "Cannot unlock file locked by another user",
            ));
        }

        if record.is_locked() {
            record.unlock();
            uow.update_file(&record).await?;
        }
        AuditService::record(
            uow.as_mut(),
            CreateAuditLogEntry::file(principal.user_id, AuditAction::Unlock, file_id),
        )
        .await?;
        uow.commit().await?;

        info!(user_id = %principal.user_id, file_id = %file_id, "File unlocked");
        Ok(record)
    }

    /// Moves a file into another folder.
    ///
    /// Write permission is checked on the source folder only. Administrators
    /// skip the lock check.
    pub async fn move_file(
        &self,
        principal: &Principal,
        file_id: Uuid,
        target_folder_id: Uuid,
    ) -> AppResult<FileRecord> {
        self.rbac.require_active(principal)?;
        let mut uow = self.store.begin().await?;
        let mut record = load_for_update(uow.as_mut(), file_id).await?;
        uow.find_folder_for_share(target_folder_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Target folder {target_folder_id} not found"))
            })?;
        self.oracle
            .require(uow.as_mut(), principal, record.folder_id, Capability::Write)
            .await?;
        can_edit(&record, principal)?;

        let source_folder_id = record.folder_id;
        record.folder_id = target_folder_id;
        record.updated_at = Utc::now();
        uow.update_file(&record).await?;
        AuditService::record(
            uow.as_mut(),
            CreateAuditLogEntry::file(principal.user_id, AuditAction::Move, file_id),
        )
        .await?;
        uow.commit().await?;

        info!(
            user_id = %principal.user_id,
            file_id = %file_id,
            from = %source_folder_id,
            to = %target_folder_id,
            "File moved"
        );
        Ok(record)
    }

    /// Deletes a file record and its payload.
    ///
    /// The record and audit entry commit first; the blob is removed
    /// afterwards, and a missing blob is not an error.
    pub async fn delete(&self, principal: &Principal, file_id: Uuid) -> AppResult<()> {
        self.rbac.require_active(principal)?;
        let mut uow = self.store.begin().await?;
        let record = load_for_update(uow.as_mut(), file_id).await?;
        self.oracle
            .require(uow.as_mut(), principal, record.folder_id, Capability::Delete)
            .await?;
        can_edit(&record, principal)?;

        if !uow.delete_file(file_id).await? {
            return Err(AppError::not_found(format!("File {file_id} not found")));
        }
        AuditService::record(
            uow.as_mut(),
            CreateAuditLogEntry::file(principal.user_id, AuditAction::Delete, file_id),
        )
        .await?;
        uow.commit().await?;

        if let Err(e) = self.storage.delete(&record.stored_name).await {
            warn!(
                file_id = %file_id,
                stored_name = %record.stored_name,
                error = %e,
                "Record deleted but blob removal failed"
            );
        }

        info!(user_id = %principal.user_id, file_id = %file_id, "File deleted");
        Ok(())
    }
}
