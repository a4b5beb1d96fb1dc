//! Passphrase protection for private keys in canonical S-expression form.
//!
//! A key management agent stores every key as one canonical S-expression:
//! a length-prefixed, binary-clean nested list. This crate transforms such
//! buffers between three forms:
//!
//! | Shape | Meaning |
//! |-------|---------|
//! | `(private-key (ALGO (p V) …))` | plaintext private key |
//! | `(protected-private-key (ALGO … (protected MODE ((sha1 SALT COUNT) IV) DATA) …))` | passphrase-protected key |
//! | `(shadowed-private-key (ALGO … (shadowed PROTOCOL LOCATOR) …))` | secret stored elsewhere, e.g. on a card |
//!
//! Protection derives an AES-128 key from the passphrase with the OpenPGP
//! iterated-and-salted S2K (SHA-1), encrypts the secret parameter lists in
//! CBC mode and embeds a SHA-1 integrity code over the plaintext key, so
//! unprotection can tell a wrong passphrase from corrupted key material.
//! All splicing is byte-exact: a protect/unprotect round trip with the right
//! passphrase reproduces the input buffer bit for bit.
//!
//! # Quick Start
//!
//! ```rust
//! use keyward::{protect, unprotect, KeyKind};
//!
//! let key: &[u8] =
//!     b"(11:private-key(3:rsa(1:n1:x)(1:e1:y)(1:d1:z)(1:p1:a)(1:q1:b)(1:u1:c)))";
//!
//! let protected = protect(key, b"correct horse").expect("protect should succeed");
//! assert_eq!(KeyKind::classify(&protected), KeyKind::Protected);
//!
//! let restored = unprotect(&protected, b"correct horse").expect("unprotect should succeed");
//! assert_eq!(restored.as_slice(), key);
//! ```
//!
//! Validated wrappers are available when buffers come from untrusted
//! storage:
//!
//! ```rust
//! use keyward::{PlainKey, ProtectedKey};
//!
//! let key = PlainKey::try_from(
//!     &b"(11:private-key(3:rsa(1:n1:x)(1:e1:y)(1:d1:z)(1:p1:a)(1:q1:b)(1:u1:c)))"[..],
//! )
//! .expect("well-formed key");
//!
//! let protected: ProtectedKey = key.protect(b"hunter2").expect("protect should succeed");
//! let restored = protected.unprotect(b"hunter2").expect("unprotect should succeed");
//! assert_eq!(restored, key);
//! ```
//!
//! # Security
//!
//! - Derived keys, decrypted material and encryption workspaces live in
//!   buffers that are zeroized on drop, on success and error paths alike
//! - Debug output of secret-bearing types redacts the contents
//! - The integrity comparison and secret equality are constant time
//! - Parsing is cursor-based over borrowed bytes and never normalizes, so
//!   integrity codes cover the exact stored bytes
//!
//! # Modules
//!
//! - [`core`] - Core types and operations

pub mod core;

// Re-export commonly used items at crate root
pub use crate::core::error::{KeywardError, KeywardResult};
pub use crate::core::operations::mic::{calculate_mic, MIC_LEN};
pub use crate::core::operations::protect::{protect, PROT_BLOCK_LEN, PROT_MODE};
pub use crate::core::operations::s2k::{
    hash_passphrase, S2kMode, S2K_COUNT_OCTET, S2K_SALT_SIZE,
};
pub use crate::core::operations::shadow::{get_shadow_info, shadow_key, SHADOW_PROTOCOL};
pub use crate::core::operations::unprotect::unprotect;
pub use crate::core::secure::SecureBuf;
pub use crate::core::sexp::{canon_len, SexpCursor};
pub use crate::core::types::{KeyKind, PlainKey, ProtectedKey, PublicKey, ShadowedKey};
