//! Staff roles.
//!
//! A role decides what a principal may do outside the folder grants: who
//! can break another user's file lock, who creates top-level folders and
//! hands out grants, and who may read the audit trail. Access to a folder's
//! contents is governed by grants, whatever the role.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role carried by a principal, ranked Admin > Manager > Employee > ReadOnly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Saves, unlocks and deletes through another user's lock, and takes
    /// the lock over on request. Creates root folders and manages grants.
    /// Skips the grant check when `access.admin_bypasses_grants` is set.
    Admin,
    /// Reads the audit trail. Otherwise works like an employee.
    Manager,
    /// Works inside the folders granted to them.
    Employee,
    /// Same grant model as an employee; usually handed read-only grants.
    ReadOnly,
}

impl UserRole {
    fn rank(self) -> u8 {
        match self {
            Self::Admin => 4,
            Self::Manager => 3,
            Self::Employee => 2,
            Self::ReadOnly => 1,
        }
    }

    /// Whether this role ranks at or above `other`.
    pub fn has_at_least(&self, other: &UserRole) -> bool {
        self.rank() >= other.rank()
    }

    /// Lock override, root folders and grant management.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Managers and admins may list audit entries.
    pub fn reads_audit_trail(&self) -> bool {
        self.has_at_least(&Self::Manager)
    }

    /// Wire and CLI spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
            Self::ReadOnly => "read_only",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = daghbas_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            "read_only" | "read-only" | "readonly" => Ok(Self::ReadOnly),
            _ => Err(daghbas_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, manager, employee, read-only"
            ))),
        }
    }
}
