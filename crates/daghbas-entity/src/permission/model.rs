//! Per-user, per-folder permission grant model.
//!
//! Grants are flat: a grant on a parent folder says nothing about its
//! children. Each folder needs its own row per user.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A (user, folder) grant row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PermissionGrant {
    /// Unique grant identifier.
    pub id: Uuid,
    /// The grantee.
    pub user_id: Uuid,
    /// The folder the grant applies to.
    pub folder_id: Uuid,
    /// May list and download.
    pub can_read: bool,
    /// May upload, save, lock, unlock and move.
    pub can_write: bool,
    /// May delete.
    pub can_delete: bool,
    /// The administrator who set the grant.
    pub granted_by: Uuid,
    /// When the grant was last set.
    pub updated_at: DateTime<Utc>,
}

impl PermissionGrant {
    /// Whether this row allows the capability.
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Read => self.can_read,
            Capability::Write => self.can_write,
            Capability::Delete => self.can_delete,
        }
    }

    /// The row's flags.
    pub fn flags(&self) -> GrantFlags {
        GrantFlags {
            can_read: self.can_read,
            can_write: self.can_write,
            can_delete: self.can_delete,
        }
    }
}

/// The three booleans a grant carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantFlags {
    /// May list and download.
    pub can_read: bool,
    /// May upload, save, lock, unlock and move.
    pub can_write: bool,
    /// May delete.
    pub can_delete: bool,
}

impl GrantFlags {
    /// Read-only access.
    pub fn read_only() -> Self {
        Self {
            can_read: true,
            ..Self::default()
        }
    }

    /// Read and write access.
    pub fn read_write() -> Self {
        Self {
            can_read: true,
            can_write: true,
            can_delete: false,
        }
    }

    /// Every capability.
    pub fn full() -> Self {
        Self {
            can_read: true,
            can_write: true,
            can_delete: true,
        }
    }
}

/// A capability checked against a folder grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Read access.
    Read,
    /// Write access.
    Write,
    /// Delete access.
    Delete,
}

impl Capability {
    /// Return the capability as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Capability {
    type Err = daghbas_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            _ => Err(daghbas_core::AppError::validation(format!(
                "Invalid capability: '{s}'"
            ))),
        }
    }
}
