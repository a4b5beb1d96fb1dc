//! PublicKey - a public key in canonical form.

use core::fmt::{self, Debug};

use crate::core::error::{KeywardError, KeywardResult};
use crate::core::sexp::{canon_len, SexpCursor};
use crate::core::types::ShadowedKey;

/// A `public-key` canonical buffer, the input to the shadow transform.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    buf: Vec<u8>,
}

impl PublicKey {
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

    /// Rewrites this key into a shadowed private key carrying `shadow_info`.
    ///
    /// # Errors
    ///
    /// See [`crate::core::operations::shadow::shadow_key`].
    pub fn shadow(&self, shadow_info: &[u8]) -> KeywardResult<ShadowedKey> {
        let shadowed = crate::core::operations::shadow_key(&self.buf, shadow_info)?;
        Ok(ShadowedKey::from_canonical_unchecked(shadowed))
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeywardError;

    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        if canon_len(buf) != buf.len() {
            return Err(KeywardError::InvalidSexp);
        }
        let mut cur = SexpCursor::new(buf);
        cur.expect(b'(')?;
        let n = cur.read_length()?;
        if !cur.match_token(n, b"public-key") {
            return Err(KeywardError::UnknownSexp);
        }
        Ok(Self { buf: buf.to_vec() })
    }
}

impl TryFrom<Vec<u8>> for PublicKey {
    type Error = KeywardError;

    fn try_from(buf: Vec<u8>) -> Result<Self, Self::Error> {
        PublicKey::try_from(buf.as_slice())
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("len", &self.buf.len())
            .finish()
    }
}
