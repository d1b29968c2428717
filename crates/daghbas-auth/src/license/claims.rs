//! License token claims.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use daghbas_core::error::AppError;
use daghbas_core::result::AppResult;

/// Claims embedded in every license token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseClaims {
    /// The device the token is bound to.
    pub device_id: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl LicenseClaims {
    /// Claims for `device_id` issued at `now` and valid for `ttl_days`.
    ///
    /// Fails with a license error when the expiry is not representable.
    pub fn new(device_id: &str, now: DateTime<Utc>, ttl_days: i64) -> AppResult<Self> {
        let exp = TimeDelta::try_days(ttl_days)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::license(format!("License lifetime of {ttl_days} days is out of range"))
            })?;
        Ok(Self {
            device_id: device_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the token is bound to `device_id`.
    pub fn is_bound_to(&self, device_id: &str) -> bool {
        self.device_id == device_id
    }
}
