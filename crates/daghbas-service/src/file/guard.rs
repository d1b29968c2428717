//! Checks shared by every mutating engine operation.

use sha2::{Digest, Sha256};
use tracing::warn;

use daghbas_core::error::AppError;
use daghbas_core::result::AppResult;
use daghbas_entity::file::FileRecord;
use daghbas_entity::user::Principal;

/// Longest accepted display name, in bytes.
pub const MAX_DISPLAY_NAME_LEN: usize = 255;

/// Lock eligibility: administrators always pass; everyone else passes
/// unless another principal holds the lock.
///
/// Folder grants are not consulted here.
pub fn can_edit(record: &FileRecord, principal: &Principal) -> AppResult<()> {
    if principal.is_admin() {
        return Ok(());
    }
    if record.is_locked_by_other(principal.user_id) {
        warn!(
            file_id = %record.id,
            user_id = %principal.user_id,
            "Edit rejected: file locked by another user"
        );
        return Err(AppError::conflict("File locked by another user"));
    }
    Ok(())
}

/// Validate a user-visible file name.
pub fn validate_display_name(name: &str) -> AppResult<&str> {
    if name.trim().is_empty() {
        return Err(AppError::validation("File name cannot be empty"));
    }
    if name.len() > MAX_DISPLAY_NAME_LEN {
        return Err(AppError::validation(format!(
            "File name exceeds {MAX_DISPLAY_NAME_LEN} bytes"
        )));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(AppError::validation(
            "File name cannot contain path separators",
        ));
    }
    Ok(name)
}

/// Reject payloads above the configured limit.
pub fn check_payload_size(len: usize, max_bytes: u64) -> AppResult<()> {
    if len as u64 > max_bytes {
        return Err(AppError::validation(format!(
            "Payload of {len} bytes exceeds the {max_bytes} byte limit"
        )));
    }
    Ok(())
}

/// Lowercase hex SHA-256 of a payload.
pub fn checksum_sha256(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
