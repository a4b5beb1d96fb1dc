//! Secure buffer for secret byte strings.
//!
//! Derived keys, decrypted key material and the encryption workspace all
//! pass through this type so that every exit path, including the error
//! paths, scrubs the bytes.
//!
//! # Security
//!
//! - Contents are zeroized on drop
//! - `Debug` output redacts the contents
//! - Equality comparison is constant time

use core::fmt::{self, Debug};
use core::ops::{Deref, DerefMut};

use zeroize::Zeroize;

use crate::core::error::{KeywardError, KeywardResult};

/// A byte buffer that is zeroized when dropped.
///
/// The full capacity is reserved at construction and growth must stay within
/// it: a reallocation would leave an unscrubbed copy of the old contents
/// behind, which is exactly what this type exists to prevent.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecureBuf(Vec<u8>);

impl SecureBuf {
    /// Creates an empty buffer with room for `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns `OutOfCore` when the allocation cannot be satisfied.
    pub fn with_capacity(capacity: usize) -> KeywardResult<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(|_| KeywardError::OutOfCore)?;
        Ok(Self(buf))
    }

    /// Creates a zero-filled buffer of exactly `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns `OutOfCore` when the allocation cannot be satisfied.
    pub fn zeroed(len: usize) -> KeywardResult<Self> {
        let mut this = Self::with_capacity(len)?;
        this.0.resize(len, 0);
        Ok(this)
    }

    /// Appends `bytes`, which must fit in the reserved capacity.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        debug_assert!(
            self.0.len() + bytes.len() <= self.0.capacity(),
            "SecureBuf must not reallocate"
        );
        self.0.extend_from_slice(bytes);
    }

    /// Returns the contents as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the contents as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }

    /// Number of bytes currently in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for SecureBuf {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SecureBuf {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl AsRef<[u8]> for SecureBuf {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for SecureBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBuf")
            .field("len", &self.0.len())
            .field("data", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for SecureBuf {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        if self.0.len() != other.0.len() {
            return false;
        }
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SecureBuf {}
