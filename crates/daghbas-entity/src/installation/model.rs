//! Installation (device license binding) entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One device bound to one signed license token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Installation {
    /// Unique installation identifier.
    pub id: Uuid,
    /// The device identifier (unique).
    pub device_id: String,
    /// Customer the device was activated for.
    pub customer_name: String,
    /// The signed license token currently bound to the device.
    pub license_token: String,
    /// Whether the installation is active.
    pub is_active: bool,
    /// When the device was first activated.
    pub created_at: DateTime<Utc>,
    /// When the binding last changed.
    pub updated_at: DateTime<Utc>,
}

impl Installation {
    /// Build a fresh, active installation row.
    pub fn activated(device_id: &str, customer_name: &str, license_token: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            device_id: device_id.to_string(),
            customer_name: customer_name.to_string(),
            license_token,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebind an existing row to a new customer name and token and mark it active.
    pub fn reactivate(&mut self, customer_name: &str, license_token: String) {
        self.customer_name = customer_name.to_string();
        self.license_token = license_token;
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    /// Mark the installation inactive. The stored token stays for reference
    /// but no longer validates.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}
