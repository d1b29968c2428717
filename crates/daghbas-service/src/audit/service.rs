//! Audit trail recording and querying.
//!
//! Entries are written through the caller's unit of work, so an accepted
//! mutation and its audit entry commit together. A failed append aborts
//! the enclosing operation.

use std::sync::Arc;

use tracing::debug;

use daghbas_auth::rbac::RbacEnforcer;
use daghbas_core::result::AppResult;
use daghbas_database::store::{AuditStore, Store};
use daghbas_entity::audit::{AuditLogEntry, CreateAuditLogEntry, TargetType};
use daghbas_entity::user::Principal;

/// Upper bound on entries returned by one query.
pub const MAX_AUDIT_ENTRIES: i64 = 500;

/// Reads the audit trail and appends to it inside units of work.
#[derive(Debug, Clone)]
pub struct AuditService {
    /// Store handle.
    store: Arc<dyn Store>,
    /// RBAC enforcer.
    rbac: RbacEnforcer,
}

impl AuditService {
    /// Creates a new audit service.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Appends an entry inside an open unit of work.
    pub async fn record<S>(uow: &mut S, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry>
    where
        S: AuditStore + ?Sized,
    {
        let entry = uow.append_audit(entry).await?;
        debug!(
            actor_id = %entry.actor_id,
            action = %entry.action,
            target_type = %entry.target_type,
            target_id = %entry.target_id,
            "Audit entry recorded"
        );
        Ok(entry)
    }

    /// Newest entries first, at most `limit` (capped at 500).
    ///
    /// Only administrators and managers may read the trail.
    pub async fn recent(&self, principal: &Principal, limit: i64) -> AppResult<Vec<AuditLogEntry>> {
        self.require_reader(principal)?;
        let limit = limit.clamp(1, MAX_AUDIT_ENTRIES);
        let mut uow = self.store.begin().await?;
        let entries = uow.recent_audit(limit).await?;
        Ok(entries)
    }

    /// Every entry for one target, newest first.
    pub async fn for_target(
        &self,
        principal: &Principal,
        target_type: TargetType,
        target_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.require_reader(principal)?;
        let mut uow = self.store.begin().await?;
        let mut entries = uow.audit_for_target(target_type.as_str(), target_id).await?;
        entries.truncate(MAX_AUDIT_ENTRIES as usize);
        Ok(entries)
    }

    fn require_reader(&self, principal: &Principal) -> AppResult<()> {
        self.rbac.require_active(principal)?;
        self.rbac.require_audit_reader(principal)
    }
}
