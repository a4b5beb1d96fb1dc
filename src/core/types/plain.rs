//! PlainKey - a plaintext private key in canonical form.
//!
//! # Security
//!
//! - Key material is zeroized on drop
//! - Debug output redacts the buffer
//! - Equality comparison is constant time

use core::fmt::{self, Debug};

use crate::core::error::{KeywardError, KeywardResult};
use crate::core::secure::SecureBuf;
use crate::core::sexp::canon_len;
use crate::core::types::{KeyKind, ProtectedKey};

/// A plaintext `private-key` canonical buffer.
///
/// Construction through `TryFrom` validates that the buffer is exactly one
/// well-formed canonical value classified as a plain private key. The secret
/// parameters are in the clear, so the buffer lives in secure memory and is
/// scrubbed on drop.
#[derive(Clone)]
pub struct PlainKey {
    buf: SecureBuf,
}

impl PlainKey {
    /// Wraps an operation result without re-validating it.
    pub(crate) fn from_canonical_unchecked(buf: SecureBuf) -> Self {
        Self { buf }
    }

    /// Returns the canonical bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_slice()
    }

    /// Length of the canonical buffer in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when the buffer is empty (never, for a validated key).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Protects this key with `passphrase`.
    ///
    /// # Errors
    ///
    /// See [`crate::core::operations::protect::protect`].
    pub fn protect(&self, passphrase: &[u8]) -> KeywardResult<ProtectedKey> {
        let protected = crate::core::operations::protect(self.as_bytes(), passphrase)?;
        Ok(ProtectedKey::from_canonical_unchecked(protected))
    }
}

// =============================================================================
// TryFrom (validated parsing)
// =============================================================================

impl TryFrom<&[u8]> for PlainKey {
    type Error = KeywardError;

    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        if canon_len(buf) != buf.len() {
            return Err(KeywardError::InvalidSexp);
        }
        if KeyKind::classify(buf) != KeyKind::Plain {
            return Err(KeywardError::UnknownSexp);
        }
        let mut secure = SecureBuf::with_capacity(buf.len())?;
        secure.extend_from_slice(buf);
        Ok(Self::from_canonical_unchecked(secure))
    }
}

impl TryFrom<Vec<u8>> for PlainKey {
    type Error = KeywardError;

    fn try_from(buf: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(buf.as_slice())
    }
}

impl AsRef<[u8]> for PlainKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

// =============================================================================
// Debug (security: don't expose key material)
// =============================================================================

impl Debug for PlainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainKey")
            .field("len", &self.buf.len())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// PartialEq (constant-time comparison)
// =============================================================================

impl PartialEq for PlainKey {
    fn eq(&self, other: &Self) -> bool {
        self.buf == other.buf
    }
}

impl Eq for PlainKey {}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_KEY: &[u8] =
        b"(11:private-key(3:rsa(1:n1:x)(1:e1:y)(1:d1:z)(1:p1:a)(1:q1:b)(1:u1:c)))";

    #[test]
    fn test_try_from_valid() -> KeywardResult<()> {
        let key = PlainKey::try_from(PLAIN_KEY)?;
        assert_eq!(key.as_bytes(), PLAIN_KEY);
        Ok(())
    }

    #[test]
    fn test_try_from_rejects_trailing_bytes() {
        let mut padded = PLAIN_KEY.to_vec();
        padded.push(b'x');
        let result = PlainKey::try_from(padded);
        assert!(matches!(result, Err(KeywardError::InvalidSexp)));
    }

    #[test]
    fn test_try_from_rejects_other_kinds() {
        let result = PlainKey::try_from(&b"(10:public-key(3:rsa(1:n1:x)))"[..]);
        assert!(matches!(result, Err(KeywardError::UnknownSexp)));
    }

    #[test]
    fn test_debug_redacts_key() -> KeywardResult<()> {
        let key = PlainKey::try_from(PLAIN_KEY)?;
        let debug_str = format!("{key:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("rsa"));
        Ok(())
    }

    #[test]
    fn test_equality() -> KeywardResult<()> {
        let a = PlainKey::try_from(PLAIN_KEY)?;
        let b = PlainKey::try_from(PLAIN_KEY)?;
        assert_eq!(a, b);
        Ok(())
    }
}
