//! ShadowedKey - a private key whose secret lives elsewhere.

use core::fmt::{self, Debug};

use crate::core::error::{KeywardError, KeywardResult};
use crate::core::sexp::canon_len;
use crate::core::types::KeyKind;

/// A `shadowed-private-key` canonical buffer.
///
/// Carries the public parameters plus an opaque locator for the externally
/// held secret. Nothing in it is confidential.
#[derive(Clone, PartialEq, Eq)]
pub struct ShadowedKey {
    buf: Vec<u8>,
}

impl ShadowedKey {
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

    /// Returns the embedded locator value.
    ///
    /// # Errors
    ///
    /// See [`crate::core::operations::shadow::get_shadow_info`].
    pub fn shadow_info(&self) -> KeywardResult<&[u8]> {
        crate::core::operations::get_shadow_info(&self.buf)
    }
}

impl TryFrom<&[u8]> for ShadowedKey {
    type Error = KeywardError;

    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        if canon_len(buf) != buf.len() {
            return Err(KeywardError::InvalidSexp);
        }
        if KeyKind::classify(buf) != KeyKind::Shadowed {
            return Err(KeywardError::UnknownSexp);
        }
        Ok(Self::from_canonical_unchecked(buf.to_vec()))
    }
}

impl TryFrom<Vec<u8>> for ShadowedKey {
    type Error = KeywardError;

    fn try_from(buf: Vec<u8>) -> Result<Self, Self::Error> {
        ShadowedKey::try_from(buf.as_slice())
    }
}

impl AsRef<[u8]> for ShadowedKey {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl Debug for ShadowedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowedKey")
            .field("len", &self.buf.len())
            .finish()
    }
}
