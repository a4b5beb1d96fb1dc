//! Error types for key protection operations.
//!
//! A single tagged error enum covers every operation in the crate. The
//! variants preserve a distinction the callers rely on: `InvalidSexp` means
//! the buffer is structurally broken, `UnknownSexp` means it is well-formed
//! but not the kind of object the operation expected, and the
//! `BadPassphrase`/`CorruptedProtection` pair separates "does not decrypt
//! into a well-formed value" from "decrypts but fails the integrity check".

use thiserror::Error;

/// Errors that can occur while protecting, unprotecting or shadowing keys.
#[derive(Debug, Error)]
pub enum KeywardError {
    /// The buffer is not a well-formed canonical S-expression.
    #[error("Invalid canonical S-expression")]
    InvalidSexp,

    /// Well-formed, but not the kind of object expected here.
    #[error("Unknown S-expression variant")]
    UnknownSexp,

    /// The key algorithm has no entry in the protection table.
    #[error("Unsupported key algorithm")]
    UnsupportedAlgorithm,

    /// The protection mode or KDF hash token is not one we implement.
    #[error("Unsupported protection mode")]
    UnsupportedProtection,

    /// The shadow protocol token is not one we implement.
    #[error("Unsupported shadow protocol")]
    UnsupportedProtocol,

    /// The protected data is shaped wrongly or fails the integrity check.
    #[error("Corrupted protection data")]
    CorruptedProtection,

    /// The decrypted bytes are not a plausible canonical value.
    #[error("Bad passphrase")]
    BadPassphrase,

    /// An argument is out of range or otherwise unusable.
    #[error("Invalid value")]
    InvalidValue,

    /// A secure-memory allocation could not be satisfied.
    #[error("Out of secure memory")]
    OutOfCore,

    /// The crypto backend rejected an operation.
    #[error("Crypto backend failure: {0}")]
    CryptoBackend(&'static str),

    /// An internal invariant was violated.
    #[error("Internal invariant violated")]
    Bug,
}

/// Result type alias for key protection operations.
pub type KeywardResult<T> = Result<T, KeywardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KeywardError::InvalidSexp;
        assert_eq!(err.to_string(), "Invalid canonical S-expression");

        let err = KeywardError::UnknownSexp;
        assert_eq!(err.to_string(), "Unknown S-expression variant");

        let err = KeywardError::UnsupportedAlgorithm;
        assert_eq!(err.to_string(), "Unsupported key algorithm");

        let err = KeywardError::UnsupportedProtection;
        assert_eq!(err.to_string(), "Unsupported protection mode");

        let err = KeywardError::UnsupportedProtocol;
        assert_eq!(err.to_string(), "Unsupported shadow protocol");

        let err = KeywardError::CorruptedProtection;
        assert_eq!(err.to_string(), "Corrupted protection data");

        let err = KeywardError::BadPassphrase;
        assert_eq!(err.to_string(), "Bad passphrase");

        let err = KeywardError::CryptoBackend("cipher init");
        assert_eq!(err.to_string(), "Crypto backend failure: cipher init");
    }

    #[test]
    fn test_error_debug() {
        let err = KeywardError::BadPassphrase;
        let debug_str = format!("{err:?}");
        assert!(debug_str.contains("BadPassphrase"));
    }
}
