//! The Permission Oracle.
//!
//! Answers whether a principal may read, write or delete in a folder.
//! Grants are flat: only the row for exactly `(user, folder)` counts, and a
//! missing row denies every capability.

use tracing::warn;
use uuid::Uuid;

use daghbas_core::config::AccessConfig;
use daghbas_core::error::AppError;
use daghbas_core::result::AppResult;
use daghbas_database::store::GrantStore;
use daghbas_entity::permission::{Capability, PermissionGrant};
use daghbas_entity::user::Principal;

/// Decides folder capabilities from the grant table.
#[derive(Debug, Clone)]
pub struct PermissionOracle {
    config: AccessConfig,
}

impl PermissionOracle {
    /// Creates an oracle with the given access settings.
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    /// Whether engine operations must pass a grant check at all.
    pub fn is_enforced(&self) -> bool {
        self.config.enforce_grants
    }

    fn admin_override(&self, principal: &Principal) -> bool {
        principal.is_admin() && self.config.admin_bypasses_grants
    }

    /// Pure decision over an already loaded grant row.
    pub fn decide(
        &self,
        principal: &Principal,
        grant: Option<&PermissionGrant>,
        capability: Capability,
    ) -> bool {
        self.admin_override(principal) || grant.is_some_and(|g| g.allows(capability))
    }

    /// Whether `principal` holds `capability` on `folder_id`.
    ///
    /// The grant is read through the caller's unit of work so that the
    /// decision and the mutation it guards see the same state.
    pub async fn allows<S>(
        &self,
        store: &mut S,
        principal: &Principal,
        folder_id: Uuid,
        capability: Capability,
    ) -> AppResult<bool>
    where
        S: GrantStore + ?Sized,
    {
        if self.admin_override(principal) {
            return Ok(true);
        }
        let grant = store.find_grant(principal.user_id, folder_id).await?;
        Ok(self.decide(principal, grant.as_ref(), capability))
    }

    /// Fails with `Forbidden` unless the capability is held.
    ///
    /// A no-op when grant enforcement is switched off.
    pub async fn require<S>(
        &self,
        store: &mut S,
        principal: &Principal,
        folder_id: Uuid,
        capability: Capability,
    ) -> AppResult<()>
    where
        S: GrantStore + ?Sized,
    {
        if !self.is_enforced() {
            return Ok(());
        }
        if self.allows(store, principal, folder_id, capability).await? {
            return Ok(());
        }
        warn!(
            user_id = %principal.user_id,
            folder_id = %folder_id,
            capability = %capability,
            "Folder permission denied"
        );
        Err(AppError::forbidden(format!(
            "Missing '{capability}' permission on folder {folder_id}"
        )))
    }
}
