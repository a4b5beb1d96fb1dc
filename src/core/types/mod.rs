//! First-class key forms.
//!
//! One type per wire form, each validating its canonical shape on
//! construction and exposing the matching transform:
//!
//! - [`PlainKey`] - plaintext `private-key` (secret, scrubbed on drop)
//! - [`ProtectedKey`] - passphrase-protected `protected-private-key`
//! - [`PublicKey`] - `public-key`, input to the shadow transform
//! - [`ShadowedKey`] - `shadowed-private-key` with an opaque locator
//! - [`KeyKind`] - cheap classification of an arbitrary buffer

mod key_kind;
mod plain;
mod protected;
mod public;
mod shadowed;

pub use key_kind::KeyKind;
pub use plain::PlainKey;
pub use protected::ProtectedKey;
pub use public::PublicKey;
pub use shadowed::ShadowedKey;
