//! License token signing and verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use daghbas_core::config::LicenseConfig;
use daghbas_core::error::{AppError, ErrorKind};

use super::claims::LicenseClaims;

/// Outcome of checking a presented token against a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCheck {
    /// Signature and binding are good.
    Valid(LicenseClaims),
    /// The signature, format or expiry check failed.
    BadSignature,
    /// The token is bound to another device.
    WrongDevice,
}

/// Creates and verifies HS256 license tokens.
#[derive(Clone)]
pub struct LicenseSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_days: i64,
}

impl std::fmt::Debug for LicenseSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseSigner")
            .field("ttl_days", &self.ttl_days)
            .finish_non_exhaustive()
    }
}

impl LicenseSigner {
    /// Creates a signer from license configuration.
    pub fn new(config: &LicenseConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iat"]);
        validation.leeway = 5;

        Self {
            encoding_key: EncodingKey::from_secret(config.signing_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_secret.as_bytes()),
            validation,
            ttl_days: config.token_ttl_days,
        }
    }

    /// Issues a fresh token bound to `device_id`.
    pub fn issue(&self, device_id: &str) -> Result<String, AppError> {
        let claims = LicenseClaims::new(device_id, Utc::now(), self.ttl_days)?;
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(ErrorKind::License, "Failed to sign license token", e)
        })
    }

    /// Decodes a token, verifying signature and expiry.
    pub fn decode(&self, token: &str) -> Result<LicenseClaims, AppError> {
        decode::<LicenseClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "License token rejected");
                AppError::with_source(ErrorKind::License, "Invalid license token", e)
            })
    }

    /// Verifies a token and its binding to `device_id`.
    pub fn check(&self, token: &str, device_id: &str) -> TokenCheck {
        match self.decode(token) {
            Ok(claims) if claims.is_bound_to(device_id) => TokenCheck::Valid(claims),
            Ok(_) => TokenCheck::WrongDevice,
            Err(_) => TokenCheck::BadSignature,
        }
    }
}
