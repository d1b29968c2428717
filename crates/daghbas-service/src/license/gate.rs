//! Device activation and license validation.
//!
//! One signed token is bound to one device. Activation is gated by the
//! shared master key; validation never fails with an error and always
//! returns a verdict.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use daghbas_auth::license::{LicenseSigner, MasterKey, TokenCheck};
use daghbas_core::config::LicenseConfig;
use daghbas_core::error::AppError;
use daghbas_core::result::AppResult;
use daghbas_database::store::Store;
use daghbas_entity::installation::Installation;

/// Token handed back by a successful activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationResult {
    /// The activated device.
    pub device_id: String,
    /// The token bound to it.
    pub license_token: String,
}

/// Outcome of a license validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseVerdict {
    /// Whether the license is valid.
    pub valid: bool,
    /// Human-readable reason.
    pub message: String,
}

impl LicenseVerdict {
    fn valid() -> Self {
        Self {
            valid: true,
            message: "License is valid".to_string(),
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            valid: false,
            message: message.to_string(),
        }
    }
}

/// Binds signed license tokens to device IDs.
#[derive(Debug, Clone)]
pub struct LicenseGate {
    /// Store handle.
    store: Arc<dyn Store>,
    /// Token signer.
    signer: LicenseSigner,
    /// Activation secret.
    master_key: MasterKey,
}

impl LicenseGate {
    /// Creates a gate from license configuration.
    pub fn new(store: Arc<dyn Store>, config: &LicenseConfig) -> Self {
        Self {
            store,
            signer: LicenseSigner::new(config),
            master_key: MasterKey::new(&config.master_key),
        }
    }

    fn require_master_key(&self, device_id: &str, presented: &str) -> AppResult<()> {
        if self.master_key.matches(presented) {
            return Ok(());
        }
        warn!(device_id, "Rejected license request with invalid master key");
        Err(AppError::forbidden("Invalid master key"))
    }

    /// Activates `device_id` for `customer_name`.
    ///
    /// An already active device gets its existing token back unchanged. An
    /// inactive or unknown device gets a freshly minted token.
    pub async fn activate(
        &self,
        device_id: &str,
        customer_name: &str,
        master_key: &str,
    ) -> AppResult<ActivationResult> {
        self.require_master_key(device_id, master_key)?;
        if device_id.trim().is_empty() {
            return Err(AppError::validation("Device ID cannot be empty"));
        }

        let mut uow = self.store.begin().await?;
        uow.lock_device(device_id).await?;
        let existing = uow.find_installation(device_id).await?;

        if let Some(installation) = existing.as_ref().filter(|i| i.is_active) {
            info!(device_id, "Device already active; returning existing license");
            return Ok(ActivationResult {
                device_id: installation.device_id.clone(),
                license_token: installation.license_token.clone(),
            });
        }

        let token = self.signer.issue(device_id)?;
        let installation = match existing {
            Some(mut installation) => {
                installation.reactivate(customer_name, token);
                installation
            }
            None => Installation::activated(device_id, customer_name, token),
        };
        uow.upsert_installation(&installation).await?;
        uow.commit().await?;

        info!(device_id, customer = %customer_name, "Device activated");
        Ok(ActivationResult {
            device_id: installation.device_id,
            license_token: installation.license_token,
        })
    }

    /// Checks a presented token against the stored binding for `device_id`.
    pub async fn validate(&self, device_id: &str, license_token: &str) -> LicenseVerdict {
        let installation = match self.find(device_id).await {
            Ok(found) => found,
            Err(e) => {
                error!(device_id, error = %e, "License lookup failed");
                return LicenseVerdict::invalid("License check unavailable");
            }
        };

        let verdict = match installation {
            Some(i) if i.is_active => {
                if i.license_token != license_token {
                    LicenseVerdict::invalid("License token mismatch")
                } else {
                    match self.signer.check(license_token, device_id) {
                        TokenCheck::Valid(_) => LicenseVerdict::valid(),
                        TokenCheck::BadSignature => LicenseVerdict::invalid("Invalid license token"),
                        TokenCheck::WrongDevice => {
                            LicenseVerdict::invalid("Token is not bound to this device")
                        }
                    }
                }
            }
            _ => LicenseVerdict::invalid("Device is not activated"),
        };

        if !verdict.valid {
            warn!(device_id, reason = %verdict.message, "License validation failed");
        }
        verdict
    }

    /// Deactivates `device_id`. A later activation mints a new token.
    pub async fn deactivate(&self, device_id: &str, master_key: &str) -> AppResult<()> {
        self.require_master_key(device_id, master_key)?;

        let mut uow = self.store.begin().await?;
        uow.lock_device(device_id).await?;
        let mut installation = uow
            .find_installation(device_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Device {device_id} is not registered")))?;
        installation.deactivate();
        uow.upsert_installation(&installation).await?;
        uow.commit().await?;

        info!(device_id, "Device deactivated");
        Ok(())
    }

    async fn find(&self, device_id: &str) -> AppResult<Option<Installation>> {
        let mut uow = self.store.begin().await?;
        let installation = uow.find_installation(device_id).await?;
        Ok(installation)
    }
}
