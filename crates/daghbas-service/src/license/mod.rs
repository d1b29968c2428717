//! The Device License Gate.

pub mod gate;

pub use gate::{ActivationResult, LicenseGate, LicenseVerdict};
