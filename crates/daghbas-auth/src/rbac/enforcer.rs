//! RBAC enforcement: checks whether a principal's role is high enough.

use tracing::warn;

use daghbas_core::error::AppError;
use daghbas_entity::user::{Principal, UserRole};

/// Enforces minimum roles for administrative operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Fails with `Authentication` for a deactivated principal.
    pub fn require_active(&self, principal: &Principal) -> Result<(), AppError> {
        principal.require_active().inspect_err(|_| {
            warn!(user_id = %principal.user_id, "Rejected inactive principal");
        })
    }

    /// Checks that the principal's role is at least `minimum`.
    ///
    /// Role hierarchy: Admin > Manager > Employee > ReadOnly
    pub fn require_minimum_role(
        &self,
        principal: &Principal,
        minimum: UserRole,
    ) -> Result<(), AppError> {
        if principal.role.has_at_least(&minimum) {
            Ok(())
        } else {
            warn!(
                user_id = %principal.user_id,
                role = %principal.role,
                required = %minimum,
                "Role check failed"
            );
            Err(AppError::forbidden(format!(
                "Role '{}' is insufficient; minimum required: '{minimum}'",
                principal.role
            )))
        }
    }

    /// Checks that the principal may read the audit trail.
    pub fn require_audit_reader(&self, principal: &Principal) -> Result<(), AppError> {
        if principal.reads_audit_trail() {
            return Ok(());
        }
        warn!(user_id = %principal.user_id, role = %principal.role, "Audit read refused");
        Err(AppError::forbidden(format!(
            "Role '{}' may not read the audit trail",
            principal.role
        )))
    }

    /// Checks that the principal is an administrator.
    pub fn require_admin(&self, principal: &Principal) -> Result<(), AppError> {
        self.require_minimum_role(principal, UserRole::Admin)
    }
}
