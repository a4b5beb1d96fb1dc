//! String-to-key (S2K) passphrase hashing.
//!
//! Turns a passphrase into key material of arbitrary length using the
//! OpenPGP string-to-key transformation (RFC 4880 §3.7) over SHA-1. The
//! protection encoder only ever uses the iterated-and-salted mode; the
//! simple and salted modes share the same feeding loop and stay available
//! for callers that read keys written by older tools.
//!
//! When the requested key is longer than one digest, additional passes run
//! with the hash context preloaded with one zero byte per pass index, and
//! the outputs are concatenated.

use sha1::{Digest, Sha1};

use crate::core::error::{KeywardError, KeywardResult};

/// Salt length in bytes for the salted modes.
pub const S2K_SALT_SIZE: usize = 8;

/// Iteration-count octet written into freshly protected keys.
///
/// Decodes to 65536 bytes of hashed material per pass.
pub const S2K_COUNT_OCTET: u32 = 96;

/// String-to-key mode.
///
/// The salted modes carry their salt, so a mode that requires one can never
/// be constructed without it.
#[derive(Debug, Clone, Copy)]
pub enum S2kMode<'a> {
    /// Hash the passphrase alone (mode 0).
    Simple,
    /// Hash salt then passphrase in a single pass (mode 1).
    Salted { salt: &'a [u8; S2K_SALT_SIZE] },
    /// Hash salt and passphrase repeatedly (mode 3). `count` is the encoded
    /// count octet, not the byte total; values beyond one octet clamp to the
    /// largest encodable count.
    IteratedSalted {
        salt: &'a [u8; S2K_SALT_SIZE],
        count: u32,
    },
}

/// Derives `key.len()` bytes of key material from `passphrase`.
///
/// # Errors
///
/// Returns `InvalidValue` when a zero-length key is requested.
pub fn hash_passphrase(
    passphrase: &[u8],
    mode: S2kMode<'_>,
    key: &mut [u8],
) -> KeywardResult<()> {
    if key.is_empty() {
        return Err(KeywardError::InvalidValue);
    }

    let len2 = passphrase.len() as u64 + S2K_SALT_SIZE as u64;
    let mut used = 0;
    let mut pass = 0usize;
    while used < key.len() {
        let mut md = Sha1::new();
        for _ in 0..pass {
            md.update([0u8]);
        }

        match mode {
            S2kMode::Simple => md.update(passphrase),
            S2kMode::Salted { salt } => feed_salted(&mut md, salt, passphrase, len2),
            S2kMode::IteratedSalted { salt, count } => {
                feed_salted(&mut md, salt, passphrase, decoded_count(count, len2));
            }
        }

        let digest = md.finalize();
        let take = (key.len() - used).min(digest.len());
        key[used..used + take].copy_from_slice(&digest[..take]);
        used += take;
        pass += 1;
    }
    Ok(())
}

/// Feeds `count` bytes of repeated salt-then-passphrase material.
fn feed_salted(md: &mut Sha1, salt: &[u8; S2K_SALT_SIZE], passphrase: &[u8], mut count: u64) {
    let len2 = passphrase.len() as u64 + S2K_SALT_SIZE as u64;
    while count > len2 {
        md.update(salt);
        md.update(passphrase);
        count -= len2;
    }
    if count < S2K_SALT_SIZE as u64 {
        md.update(&salt[..count as usize]);
    } else {
        md.update(salt);
        count -= S2K_SALT_SIZE as u64;
        md.update(&passphrase[..count as usize]);
    }
}

/// Decodes a count octet into the number of bytes to hash per pass.
///
/// The count is encoded in one octet (RFC 4880 §3.7.1.3); values outside
/// that range clamp to the largest encodable count, which keeps the feed
/// loop bounded for any caller-supplied value. The result is clamped up to
/// one full salt-and-passphrase unit.
fn decoded_count(octet: u32, len2: u64) -> u64 {
    const MAX_COUNT: u64 = 31 << 21; // octet 0xFF

    let count = if octet > 0xFF {
        MAX_COUNT
    } else {
        (16 + u64::from(octet & 15)) << (u64::from(octet >> 4) + 6)
    };
    count.max(len2)
}
