//! ProtectedKey - a passphrase-protected private key.

use core::fmt::{self, Debug};

use crate::core::error::{KeywardError, KeywardResult};
use crate::core::sexp::canon_len;
use crate::core::types::{KeyKind, PlainKey};

/// A `protected-private-key` canonical buffer.
///
/// The secret parameters inside are encrypted, so the buffer itself is safe
/// to store and to compare; only [`ProtectedKey::unprotect`] with the right
/// passphrase yields the plaintext again.
#[derive(Clone)]
pub struct ProtectedKey {
    buf: Vec<u8>,
}

impl ProtectedKey {
    /// Wraps an operation result without re-validating it.
    pub(crate) fn from_canonical_unchecked(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    /// Returns the canonical bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
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

    /// Consumes the key and returns the canonical bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Recovers the plaintext key using `passphrase`.
    ///
    /// # Errors
    ///
    /// See [`crate::core::operations::unprotect::unprotect`].
    pub fn unprotect(&self, passphrase: &[u8]) -> KeywardResult<PlainKey> {
        let plain = crate::core::operations::unprotect(self.as_bytes(), passphrase)?;
        Ok(PlainKey::from_canonical_unchecked(plain))
    }
}

// =============================================================================
// TryFrom (validated parsing)
// =============================================================================

impl TryFrom<&[u8]> for ProtectedKey {
    type Error = KeywardError;

    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        if canon_len(buf) != buf.len() {
            return Err(KeywardError::InvalidSexp);
        }
        if KeyKind::classify(buf) != KeyKind::Protected {
            return Err(KeywardError::UnknownSexp);
        }
        Ok(Self::from_canonical_unchecked(buf.to_vec()))
    }
}

impl TryFrom<Vec<u8>> for ProtectedKey {
    type Error = KeywardError;

    fn try_from(buf: Vec<u8>) -> Result<Self, Self::Error> {
        if canon_len(&buf) != buf.len() {
            return Err(KeywardError::InvalidSexp);
        }
        if KeyKind::classify(&buf) != KeyKind::Protected {
            return Err(KeywardError::UnknownSexp);
        }
        Ok(Self::from_canonical_unchecked(buf))
    }
}

impl AsRef<[u8]> for ProtectedKey {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

// =============================================================================
// Debug
// =============================================================================

impl Debug for ProtectedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectedKey")
            .field("len", &self.buf.len())
            .field("parameters", &"[ENCRYPTED]")
            .finish()
    }
}

impl PartialEq for ProtectedKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        if self.buf.len() != other.buf.len() {
            return false;
        }
        self.buf.ct_eq(&other.buf).into()
    }
}

impl Eq for ProtectedKey {}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_KEY: &[u8] =
        b"(11:private-key(3:rsa(1:n1:x)(1:e1:y)(1:d1:z)(1:p1:a)(1:q1:b)(1:u1:c)))";

    #[test]
    fn test_protect_unprotect_via_types() -> KeywardResult<()> {
        let plain = PlainKey::try_from(PLAIN_KEY)?;
        let protected = plain.protect(b"hunter2")?;
        assert_eq!(KeyKind::classify(protected.as_bytes()), KeyKind::Protected);

        let restored = protected.unprotect(b"hunter2")?;
        assert_eq!(restored, plain);
        Ok(())
    }

    #[test]
    fn test_serialize_parse_roundtrip() -> KeywardResult<()> {
        let plain = PlainKey::try_from(PLAIN_KEY)?;
        let protected = plain.protect(b"hunter2")?;

        let parsed = ProtectedKey::try_from(protected.as_bytes())?;
        assert_eq!(parsed, protected);

        let restored = parsed.unprotect(b"hunter2")?;
        assert_eq!(restored.as_bytes(), PLAIN_KEY);
        Ok(())
    }

    #[test]
    fn test_try_from_rejects_plain() {
        let result = ProtectedKey::try_from(PLAIN_KEY);
        assert!(matches!(result, Err(KeywardError::UnknownSexp)));
    }

    #[test]
    fn test_debug() -> KeywardResult<()> {
        let plain = PlainKey::try_from(PLAIN_KEY)?;
        let protected = plain.protect(b"hunter2")?;
        let debug_str = format!("{protected:?}");
        assert!(debug_str.contains("ProtectedKey"));
        assert!(debug_str.contains("[ENCRYPTED]"));
        Ok(())
    }
}
