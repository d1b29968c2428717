//! Folder grant enforcement configuration.

use serde::{Deserialize, Serialize};

/// Controls how the permission oracle is composed with the lock checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Require a folder grant (`write`, or `delete` for deletes) on every
    /// mutating file operation in addition to the lock check.
    #[serde(default = "default_true")]
    pub enforce_grants: bool,
    /// Administrators pass every grant check without a grant row.
    #[serde(default = "default_true")]
    pub admin_bypasses_grants: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            enforce_grants: true,
            admin_bypasses_grants: true,
        }
    }
}

fn default_true() -> bool {
    true
}
