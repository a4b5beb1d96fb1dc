//! Passphrase protection encoder.
//!
//! Rewrites a plaintext `private-key` into a `protected-private-key`: the
//! secret parameter lists are encrypted under a key derived from the
//! passphrase, and a `(protected MODE ((sha1 SALT COUNT) IV) CIPHERTEXT)`
//! list takes their place. The encrypted block also carries a SHA-1 MIC of
//! the whole plaintext inner list so the decoder can verify it reassembled
//! the original key bit for bit.
//!
//! All byte spans are spliced verbatim from the input; nothing is
//! re-serialized, so a protect/unprotect round trip reproduces the input
//! exactly.

use aes::cipher::{block_padding::NoPadding, BlockEncryptMut, KeyIvInit};
use aes::Aes128;
use rand_core::{OsRng, TryRngCore};
use sha1::{Digest, Sha1};

use crate::core::algo::AlgoInfo;
use crate::core::error::{KeywardError, KeywardResult};
use crate::core::operations::mic::MIC_LEN;
use crate::core::operations::s2k::{hash_passphrase, S2kMode, S2K_COUNT_OCTET, S2K_SALT_SIZE};
use crate::core::secure::SecureBuf;
use crate::core::sexp::SexpCursor;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;

/// Cipher block length in bytes (AES).
pub const PROT_BLOCK_LEN: usize = 16;

/// Symmetric key length in bytes (AES-128).
pub(crate) const PROT_KEY_LEN: usize = 16;

/// Protection mode token stored in the wrapped key.
pub const PROT_MODE: &str = "openpgp-s2k3-sha1-aes-cbc";

/// Encrypts the protected parameter span and emits the `(protected …)` list.
///
/// The plaintext handed to the cipher is
/// `((<parameters>)(4:hash4:sha120:<mic>))` followed by one block of random
/// padding; only the block-aligned prefix of that is encrypted.
fn encrypt_region(
    prot_region: &[u8],
    passphrase: &[u8],
    mic: &[u8; MIC_LEN],
) -> KeywardResult<Vec<u8>> {
    const TRAILER: &[u8] = b")(4:hash4:sha120:";

    let outlen = 2 + prot_region.len() + TRAILER.len() + MIC_LEN + 2 + PROT_BLOCK_LEN;
    let enclen = outlen / PROT_BLOCK_LEN * PROT_BLOCK_LEN;

    // One draw covers the IV, the padding tail and the S2K salt.
    let mut random = [0u8; 2 * PROT_BLOCK_LEN + S2K_SALT_SIZE];
    OsRng
        .try_fill_bytes(&mut random)
        .map_err(|_| KeywardError::CryptoBackend("rng"))?;
    let (iv, rest) = random.split_at(PROT_BLOCK_LEN);
    let (pad, salt) = rest.split_at(PROT_BLOCK_LEN);
    let salt: &[u8; S2K_SALT_SIZE] = salt.try_into().map_err(|_| KeywardError::Bug)?;

    let mut key = SecureBuf::zeroed(PROT_KEY_LEN)?;
    hash_passphrase(
        passphrase,
        S2kMode::IteratedSalted {
            salt,
            count: S2K_COUNT_OCTET,
        },
        key.as_mut_slice(),
    )?;

    let mut workspace = SecureBuf::with_capacity(outlen)?;
    workspace.extend_from_slice(b"((");
    workspace.extend_from_slice(prot_region);
    workspace.extend_from_slice(TRAILER);
    workspace.extend_from_slice(mic);
    workspace.extend_from_slice(b"))");
    workspace.extend_from_slice(pad);
    debug_assert_eq!(workspace.len(), outlen);

    Aes128CbcEnc::new_from_slices(key.as_slice(), iv)
        .map_err(|_| KeywardError::CryptoBackend("cipher key/iv length"))?
        .encrypt_padded_mut::<NoPadding>(&mut workspace.as_mut_slice()[..enclen], enclen)
        .map_err(|_| KeywardError::CryptoBackend("block encryption"))?;

    let mode_atom = format!("{}:{}", PROT_MODE.len(), PROT_MODE);
    let count_atom = {
        let count = S2K_COUNT_OCTET.to_string();
        format!("{}:{}", count.len(), count)
    };
    let cipher_prefix = format!("{enclen}:");

    let mut out = Vec::with_capacity(
        12 + mode_atom.len() + 10 + S2K_SALT_SIZE + count_atom.len() + 4 + PROT_BLOCK_LEN
            + 1 + cipher_prefix.len() + enclen + 1,
    );
    out.extend_from_slice(b"(9:protected");
    out.extend_from_slice(mode_atom.as_bytes());
    out.extend_from_slice(b"((4:sha18:");
    out.extend_from_slice(salt);
    out.extend_from_slice(count_atom.as_bytes());
    out.extend_from_slice(b")16:");
    out.extend_from_slice(iv);
    out.extend_from_slice(b")");
    out.extend_from_slice(cipher_prefix.as_bytes());
    out.extend_from_slice(&workspace.as_slice()[..enclen]);
    out.push(b')');
    Ok(out)
}

/// Protects a plaintext canonical `private-key` with `passphrase`.
///
/// Returns a freshly allocated `protected-private-key` canonical buffer.
/// Bytes following the key expression in `plainkey` are ignored.
///
/// # Errors
///
/// `InvalidSexp` for structural damage, `UnknownSexp` when the buffer is not
/// a `private-key`, `UnsupportedAlgorithm` when the algorithm has no table
/// entry, `OutOfCore` when secure memory is exhausted, or a wrapped backend
/// failure.
pub fn protect(plainkey: &[u8], passphrase: &[u8]) -> KeywardResult<Vec<u8>> {
    let mut cur = SexpCursor::new(plainkey);
    cur.expect(b'(')?;
    let n = cur.read_length()?;
    let name_start = cur.pos();
    if !cur.match_token(n, b"private-key") {
        return Err(KeywardError::UnknownSexp);
    }
    if !cur.at(b'(') {
        return Err(KeywardError::UnknownSexp);
    }
    let hash_begin = cur.pos();
    cur.expect(b'(')?;
    let algo = cur.atom()?;
    let info = AlgoInfo::lookup(algo).ok_or(KeywardError::UnsupportedAlgorithm)?;

    let mut prot_begin = None;
    let mut prot_end = None;
    for (i, parm) in info.parmlist.bytes().enumerate() {
        if i == info.prot_from {
            prot_begin = Some(cur.pos());
        }
        cur.expect(b'(')?;
        let n = cur.read_length()?;
        if !cur.match_token(n, &[parm]) {
            return Err(KeywardError::InvalidSexp);
        }
        let n = cur.read_length()?;
        cur.advance(n)?;
        if !cur.at(b')') {
            return Err(KeywardError::InvalidSexp);
        }
        if i == info.prot_to {
            prot_end = Some(cur.pos());
        }
        cur.expect(b')')?;
    }
    if !cur.at(b')') {
        return Err(KeywardError::InvalidSexp);
    }
    let hash_end = cur.pos();
    let (Some(prot_begin), Some(prot_end)) = (prot_begin, prot_end) else {
        return Err(KeywardError::InvalidSexp);
    };
    cur.expect(b')')?;
    cur.skip(1)?;
    let real_end = cur.pos() - 1; // the outer close paren

    let mic: [u8; MIC_LEN] = Sha1::digest(&plainkey[hash_begin..=hash_end]).into();
    let protected = encrypt_region(&plainkey[prot_begin..=prot_end], passphrase, &mic)?;

    // The head is rewritten from "private-key" to "protected-private-key";
    // everything between the token and the protected span is copied verbatim.
    let mut out =
        Vec::with_capacity(14 + (prot_begin - name_start) + protected.len() + (real_end - prot_end));
    out.extend_from_slice(b"(21:protected-");
    out.extend_from_slice(&plainkey[name_start..prot_begin]);
    out.extend_from_slice(&protected);
    out.extend_from_slice(&plainkey[prot_end + 1..=real_end]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sexp::canon_len;
    use crate::core::types::KeyKind;

    const PLAIN_KEY: &[u8] =
        b"(11:private-key(3:rsa(1:n1:x)(1:e1:y)(1:d1:z)(1:p1:a)(1:q1:b)(1:u1:c)))";

    #[test]
    fn test_protect_output_shape() -> KeywardResult<()> {
        let protected = protect(PLAIN_KEY, b"abc")?;

        assert!(protected.starts_with(b"(21:protected-private-key(3:rsa(1:n1:x)(1:e1:y)"));
        assert!(protected.ends_with(b")"));
        assert_eq!(KeyKind::classify(&protected), KeyKind::Protected);
        assert_eq!(canon_len(&protected), protected.len());

        // The public parameters stay in the clear, the secret ones do not.
        let mode_pos = protected
            .windows(PROT_MODE.len())
            .position(|w| w == PROT_MODE.as_bytes());
        assert!(mode_pos.is_some());
        assert!(!protected.windows(8).any(|w| w == b"(1:d1:z)"));
        Ok(())
    }

    #[test]
    fn test_protect_is_randomized() -> KeywardResult<()> {
        let a = protect(PLAIN_KEY, b"abc")?;
        let b = protect(PLAIN_KEY, b"abc")?;
        assert_ne!(a, b);
        assert_eq!(a.len(), b.len());
        Ok(())
    }

    #[test]
    fn test_protect_ignores_trailing_bytes() -> KeywardResult<()> {
        let mut padded = PLAIN_KEY.to_vec();
        padded.extend_from_slice(b"trailing");
        let protected = protect(&padded, b"abc")?;
        assert_eq!(canon_len(&protected), protected.len());
        Ok(())
    }

    #[test]
    fn test_protect_unknown_algorithm() {
        let key = b"(11:private-key(3:dsa(1:n1:x)(1:e1:y)(1:d1:z)(1:p1:a)(1:q1:b)(1:u1:c)))";
        let result = protect(key, b"abc");
        assert!(matches!(result, Err(KeywardError::UnsupportedAlgorithm)));
    }

    #[test]
    fn test_protect_wrong_kind() {
        let result = protect(b"(10:public-key(3:rsa(1:n1:x)))", b"abc");
        assert!(matches!(result, Err(KeywardError::UnknownSexp)));
    }

    #[test]
    fn test_protect_wrong_parameter_order() {
        let key = b"(11:private-key(3:rsa(1:e1:y)(1:n1:x)(1:d1:z)(1:p1:a)(1:q1:b)(1:u1:c)))";
        let result = protect(key, b"abc");
        assert!(matches!(result, Err(KeywardError::InvalidSexp)));
    }

    #[test]
    fn test_protect_truncated_input() {
        let result = protect(b"(11:private-key(3:rsa(1:n1:x)", b"abc");
        assert!(matches!(result, Err(KeywardError::InvalidSexp)));
    }

    #[test]
    fn test_encrypt_region_layout() -> KeywardResult<()> {
        let region = b"(1:d1:z)(1:p1:a)(1:q1:b)(1:u1:c)";
        let mic = [0u8; MIC_LEN];
        let out = encrypt_region(region, b"abc", &mic)?;

        // (9:protected 25:MODE ((4:sha1 8:SALT 2:96) 16:IV) ENCLEN:CIPHER)
        assert!(out.starts_with(b"(9:protected25:openpgp-s2k3-sha1-aes-cbc((4:sha18:"));
        let sexp_len = 2 + region.len() + 17 + MIC_LEN + 2;
        let enclen = (sexp_len + PROT_BLOCK_LEN) / PROT_BLOCK_LEN * PROT_BLOCK_LEN;
        assert!(enclen % PROT_BLOCK_LEN == 0 && enclen >= sexp_len);

        let salt_end = b"(9:protected25:openpgp-s2k3-sha1-aes-cbc((4:sha18:".len() + 8;
        assert_eq!(&out[salt_end..salt_end + 8], b"2:96)16:");
        Ok(())
    }
}
