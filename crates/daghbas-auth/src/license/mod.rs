//! Device license tokens.
//!
//! A license token is an HS256 JWT binding one device ID. Issuance is gated
//! by a shared master key compared in constant time.

pub mod claims;
pub mod master_key;
pub mod signer;

pub use claims::LicenseClaims;
pub use master_key::MasterKey;
pub use signer::{LicenseSigner, TokenCheck};
