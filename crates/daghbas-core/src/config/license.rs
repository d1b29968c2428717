//! Device license configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Placeholder master key shipped in the default configuration.
pub const PLACEHOLDER_MASTER_KEY: &str = "change-me-master-key";
/// Longest accepted license lifetime in days.
pub const MAX_TOKEN_TTL_DAYS: i64 = 36_500;
/// Placeholder signing secret shipped in the default configuration.
pub const PLACEHOLDER_SIGNING_SECRET: &str = "change-me-license-secret";

/// Device license gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseConfig {
    /// Shared secret an installer must present to activate a device.
    #[serde(default = "default_master_key")]
    pub master_key: String,
    /// HMAC-SHA256 secret used to sign license tokens.
    #[serde(default = "default_signing_secret")]
    pub signing_secret: String,
    /// Lifetime of an issued license token in days.
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
    /// Permit the placeholder secrets (development only).
    #[serde(default)]
    pub allow_insecure_defaults: bool,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            master_key: default_master_key(),
            signing_secret: default_signing_secret(),
            token_ttl_days: default_token_ttl_days(),
            allow_insecure_defaults: false,
        }
    }
}

impl LicenseConfig {
    /// Check that both secrets are set and not left at their placeholders.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.master_key.is_empty() || self.signing_secret.is_empty() {
            return Err(AppError::configuration(
                "license.master_key and license.signing_secret must not be empty",
            ));
        }
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&self.token_ttl_days) {
            return Err(AppError::configuration(format!(
                "license.token_ttl_days must be between 1 and {MAX_TOKEN_TTL_DAYS}"
            )));
        }
        let uses_placeholder = self.master_key == PLACEHOLDER_MASTER_KEY
            || self.signing_secret == PLACEHOLDER_SIGNING_SECRET;
        if uses_placeholder && !self.allow_insecure_defaults {
            return Err(AppError::configuration(
                "license secrets are still set to their placeholders; \
                 set license.allow_insecure_defaults for development",
            ));
        }
        Ok(())
    }
}

fn default_master_key() -> String {
    PLACEHOLDER_MASTER_KEY.to_string()
}

fn default_signing_secret() -> String {
    PLACEHOLDER_SIGNING_SECRET.to_string()
}

fn default_token_ttl_days() -> i64 {
    3650
}
