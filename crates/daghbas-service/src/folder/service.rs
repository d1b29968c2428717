//! Folder tree maintenance.
//!
//! Root folders are created by administrators. A child folder needs `write`
//! on its parent, and removing a folder needs `delete` on it.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use daghbas_auth::acl::PermissionOracle;
use daghbas_auth::rbac::RbacEnforcer;
use daghbas_core::error::AppError;
use daghbas_core::result::AppResult;
use daghbas_database::store::Store;
use daghbas_entity::audit::{AuditAction, CreateAuditLogEntry};
use daghbas_entity::folder::{CreateFolder, Folder};
use daghbas_entity::permission::Capability;
use daghbas_entity::user::Principal;

use crate::audit::AuditService;

/// Longest accepted folder name, in bytes.
const MAX_FOLDER_NAME_LEN: usize = 255;

/// Manages folder CRUD operations.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Store handle.
    store: Arc<dyn Store>,
    /// Folder permission oracle.
    oracle: Arc<PermissionOracle>,
    /// RBAC enforcer.
    rbac: RbacEnforcer,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(store: Arc<dyn Store>, oracle: Arc<PermissionOracle>) -> Self {
        Self {
            store,
            oracle,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Creates a folder under `parent_id`, or a root folder when `None`.
    pub async fn create_folder(
        &self,
        principal: &Principal,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> AppResult<Folder> {
        self.rbac.require_active(principal)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }
        if name.len() > MAX_FOLDER_NAME_LEN {
            return Err(AppError::validation(format!(
                "Folder name exceeds {MAX_FOLDER_NAME_LEN} bytes"
            )));
        }

        let mut uow = self.store.begin().await?;
        match parent_id {
            Some(parent) => {
                uow.find_folder_for_share(parent)
                    .await?
                    .ok_or_else(|| AppError::not_found("Parent folder not found"))?;
                self.oracle
                    .require(uow.as_mut(), principal, parent, Capability::Write)
                    .await?;
            }
            None => self.rbac.require_admin(principal)?,
        }

        let folder = CreateFolder {
            parent_id,
            name: name.to_string(),
            created_by: principal.user_id,
        }
        .into_folder();
        uow.insert_folder(&folder).await?;
        AuditService::record(
            uow.as_mut(),
            CreateAuditLogEntry::folder(principal.user_id, AuditAction::FolderCreate, folder.id),
        )
        .await?;
        uow.commit().await?;

        info!(
            user_id = %principal.user_id,
            folder_id = %folder.id,
            parent_id = ?parent_id,
            "Folder created"
        );
        Ok(folder)
    }

    /// Gets a folder by ID.
    pub async fn get_folder(&self, principal: &Principal, folder_id: Uuid) -> AppResult<Folder> {
        self.rbac.require_active(principal)?;
        let mut uow = self.store.begin().await?;
        let folder = uow
            .find_folder(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        Ok(folder)
    }

    /// Whether a folder exists.
    pub async fn exists(&self, folder_id: Uuid) -> AppResult<bool> {
        let mut uow = self.store.begin().await?;
        Ok(uow.find_folder(folder_id).await?.is_some())
    }

    /// Lists every folder.
    pub async fn list_folders(&self, principal: &Principal) -> AppResult<Vec<Folder>> {
        self.rbac.require_active(principal)?;
        let mut uow = self.store.begin().await?;
        let folders = uow.list_folders().await?;
        Ok(folders)
    }

    /// Lists the direct children of a folder.
    pub async fn list_children(
        &self,
        principal: &Principal,
        parent_id: Uuid,
    ) -> AppResult<Vec<Folder>> {
        self.rbac.require_active(principal)?;
        let mut uow = self.store.begin().await?;
        uow.find_folder(parent_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {parent_id} not found")))?;
        let children = uow.list_child_folders(parent_id).await?;
        Ok(children)
    }

    /// Deletes an empty folder.
    ///
    /// Fails with `Conflict` while the folder still holds files or child
    /// folders.
    pub async fn delete_folder(&self, principal: &Principal, folder_id: Uuid) -> AppResult<()> {
        self.rbac.require_active(principal)?;
        let mut uow = self.store.begin().await?;
        uow.find_folder_for_update(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        self.oracle
            .require(uow.as_mut(), principal, folder_id, Capability::Delete)
            .await?;

        let files = uow.count_files(folder_id).await?;
        let children = uow.list_child_folders(folder_id).await?.len();
        if files > 0 || children > 0 {
            warn!(
                folder_id = %folder_id,
                files,
                children,
                "Folder delete rejected: folder is not empty"
            );
            return Err(AppError::conflict(format!(
                "Folder {folder_id} is not empty ({files} files, {children} folders)"
            )));
        }

        uow.delete_folder(folder_id).await?;
        AuditService::record(
            uow.as_mut(),
            CreateAuditLogEntry::folder(principal.user_id, AuditAction::FolderDelete, folder_id),
        )
        .await?;
        uow.commit().await?;

        info!(user_id = %principal.user_id, folder_id = %folder_id, "Folder deleted");
        Ok(())
    }
}
