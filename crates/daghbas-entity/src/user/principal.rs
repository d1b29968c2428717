//! The authenticated caller of every engine operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use daghbas_core::error::AppError;

use super::role::UserRole;

/// An authenticated caller.
///
/// Supplied already validated by the surrounding auth layer; the engine
/// trusts it and performs no token parsing itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The caller's user ID.
    pub user_id: Uuid,
    /// The caller's role.
    pub role: UserRole,
    /// Whether the account is active.
    pub active: bool,
}

impl Principal {
    /// Creates an active principal.
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id,
            role,
            active: true,
        }
    }

    /// Returns whether the caller is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Returns whether the caller may list audit entries.
    pub fn reads_audit_trail(&self) -> bool {
        self.role.reads_audit_trail()
    }

    /// Fails with `Authentication` for deactivated accounts.
    pub fn require_active(&self) -> Result<(), AppError> {
        if self.active {
            Ok(())
        } else {
            Err(AppError::authentication("Inactive or missing user"))
        }
    }
}
