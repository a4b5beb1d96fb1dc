//! Key protection operations.
//!
//! This module provides the cryptographic operations behind the key forms:
//!
//! - [`s2k`] - passphrase-to-key derivation (OpenPGP S2K)
//! - [`mic`] - integrity code over a plaintext key
//! - [`protect`] - passphrase protection encoder
//! - [`unprotect`] - protection decoder
//! - [`shadow`] - shadow-key transform and locator extraction

pub mod mic;
pub mod protect;
pub mod s2k;
pub mod shadow;
pub mod unprotect;

// Re-export the operation entry points
pub use mic::calculate_mic;
pub use protect::protect;
pub use shadow::{get_shadow_info, shadow_key};
pub use unprotect::unprotect;
