//! Grant management: set, revoke and list (user, folder) grants.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use daghbas_auth::rbac::RbacEnforcer;
use daghbas_core::error::AppError;
use daghbas_core::result::AppResult;
use daghbas_database::store::Store;
use daghbas_entity::audit::{AuditAction, CreateAuditLogEntry};
use daghbas_entity::permission::{GrantFlags, PermissionGrant};
use daghbas_entity::user::Principal;

use crate::audit::AuditService;

/// Manages the flat grant table. Administrator only.
#[derive(Debug, Clone)]
pub struct PermissionService {
    /// Store handle.
    store: Arc<dyn Store>,
    /// RBAC enforcer.
    rbac: RbacEnforcer,
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Sets the grant for `user_id` on `folder_id`, replacing any existing flags.
    pub async fn grant(
        &self,
        principal: &Principal,
        user_id: Uuid,
        folder_id: Uuid,
        flags: GrantFlags,
    ) -> AppResult<PermissionGrant> {
        self.require_grant_admin(principal)?;

        let mut uow = self.store.begin().await?;
        uow.find_folder_for_share(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        let grant = uow
            .upsert_grant(&PermissionGrant {
                id: Uuid::now_v7(),
                user_id,
                folder_id,
                can_read: flags.can_read,
                can_write: flags.can_write,
                can_delete: flags.can_delete,
                granted_by: principal.user_id,
                updated_at: Utc::now(),
            })
            .await?;
        AuditService::record(
            uow.as_mut(),
            CreateAuditLogEntry::folder(principal.user_id, AuditAction::PermissionGrant, folder_id),
        )
        .await?;
        uow.commit().await?;

        info!(
            admin_id = %principal.user_id,
            user_id = %user_id,
            folder_id = %folder_id,
            can_read = flags.can_read,
            can_write = flags.can_write,
            can_delete = flags.can_delete,
            "Folder permission granted"
        );
        Ok(grant)
    }

    /// Removes the grant for `user_id` on `folder_id`.
    pub async fn revoke(&self, principal: &Principal, user_id: Uuid, folder_id: Uuid) -> AppResult<()> {
        self.require_grant_admin(principal)?;

        let mut uow = self.store.begin().await?;
        if !uow.delete_grant(user_id, folder_id).await? {
            return Err(AppError::not_found(format!(
                "No grant for user {user_id} on folder {folder_id}"
            )));
        }
        AuditService::record(
            uow.as_mut(),
            CreateAuditLogEntry::folder(principal.user_id, AuditAction::PermissionRevoke, folder_id),
        )
        .await?;
        uow.commit().await?;

        info!(
            admin_id = %principal.user_id,
            user_id = %user_id,
            folder_id = %folder_id,
            "Folder permission revoked"
        );
        Ok(())
    }

    /// Lists the grants on a folder.
    pub async fn list_for_folder(
        &self,
        principal: &Principal,
        folder_id: Uuid,
    ) -> AppResult<Vec<PermissionGrant>> {
        self.require_grant_admin(principal)?;
        let mut uow = self.store.begin().await?;
        let grants = uow.list_grants_for_folder(folder_id).await?;
        Ok(grants)
    }

    fn require_grant_admin(&self, principal: &Principal) -> AppResult<()> {
        self.rbac.require_active(principal)?;
        self.rbac.require_admin(principal)
    }
}
