//! Protection decoder.
//!
//! Inverse of the protect encoder: locates the `(protected …)` list inside a
//! `protected-private-key`, re-derives the symmetric key from the passphrase
//! and the stored salt and count, decrypts, and splices the recovered
//! parameter lists back between the surrounding public parameters. The
//! SHA-1 MIC recovered from the decrypted block must match a MIC computed
//! over the reassembled plaintext; the two failure modes stay distinct so a
//! caller can tell a mistyped passphrase from damaged key material.

use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, KeyIvInit};
use aes::Aes128;
use subtle::ConstantTimeEq;

use crate::core::algo::AlgoInfo;
use crate::core::error::{KeywardError, KeywardResult};
use crate::core::operations::mic::{calculate_mic, MIC_LEN};
use crate::core::operations::protect::{PROT_BLOCK_LEN, PROT_KEY_LEN, PROT_MODE};
use crate::core::operations::s2k::{hash_passphrase, S2kMode, S2K_SALT_SIZE};
use crate::core::secure::SecureBuf;
use crate::core::sexp::{canon_len, SexpCursor};

type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Length of `(21:protected-private-key`, the head every protected key
/// starts with. The walker has verified the top atom before the merge relies
/// on this.
const PROTECTED_PREFIX_LEN: usize = 25;

/// Decrypts the ciphertext and checks that the result is plausibly the
/// canonical two-list value the encoder produced.
fn decrypt_region(
    ciphertext: &[u8],
    passphrase: &[u8],
    salt: &[u8; S2K_SALT_SIZE],
    count: u32,
    iv: &[u8],
) -> KeywardResult<SecureBuf> {
    if ciphertext.is_empty() || ciphertext.len() % PROT_BLOCK_LEN != 0 {
        return Err(KeywardError::CorruptedProtection);
    }

    let mut key = SecureBuf::zeroed(PROT_KEY_LEN)?;
    hash_passphrase(passphrase, S2kMode::IteratedSalted { salt, count }, key.as_mut_slice())?;

    let mut cleartext = SecureBuf::zeroed(ciphertext.len())?;
    cleartext.as_mut_slice().copy_from_slice(ciphertext);
    Aes128CbcDec::new_from_slices(key.as_slice(), iv)
        .map_err(|_| KeywardError::CryptoBackend("cipher key/iv length"))?
        .decrypt_padded_mut::<NoPadding>(cleartext.as_mut_slice())
        .map_err(|_| KeywardError::CryptoBackend("block decryption"))?;

    // Quick check first; a wrong passphrase almost never decrypts to "((".
    let bytes = cleartext.as_slice();
    if bytes.len() < 2 || bytes[0] != b'(' || bytes[1] != b'(' {
        return Err(KeywardError::BadPassphrase);
    }
    let reallen = canon_len(bytes);
    if reallen == 0 || reallen + PROT_BLOCK_LEN < bytes.len() {
        return Err(KeywardError::BadPassphrase);
    }
    Ok(cleartext)
}

/// Splices the decrypted parameter lists back into the outer key.
///
/// `replacepos` is the offset of the `(protected …)` list inside
/// `protectedkey`. Returns the reassembled `private-key` buffer and the MIC
/// carried in the decrypted block.
fn merge_lists(
    protectedkey: &[u8],
    replacepos: usize,
    cleartext: &[u8],
) -> KeywardResult<(SecureBuf, [u8; MIC_LEN])> {
    if replacepos < PROTECTED_PREFIX_LEN + 1 {
        return Err(KeywardError::Bug);
    }
    let outer_len = canon_len(protectedkey);
    let inner_len = canon_len(cleartext);
    if outer_len == 0 || inner_len == 0 {
        return Err(KeywardError::Bug);
    }

    // Upper bound: the outer key shrinks by "protected-" and the whole
    // protected list, and gains at most the cleartext.
    let mut out = SecureBuf::with_capacity(outer_len + inner_len)?;
    out.extend_from_slice(b"(11:private-key");
    out.extend_from_slice(&protectedkey[PROTECTED_PREFIX_LEN..replacepos]);

    let mut cur = SexpCursor::new(cleartext);
    cur.expect(b'(')?;
    cur.expect(b'(')?;
    let startpos = cur.pos();
    while cur.at(b'(') {
        cur.expect(b'(')?;
        let n = cur.read_length()?;
        cur.advance(n)?;
        let n = cur.read_length()?;
        cur.advance(n)?;
        cur.expect(b')')?;
    }
    if !cur.at(b')') {
        return Err(KeywardError::InvalidSexp);
    }
    let endpos = cur.pos();
    cur.expect(b')')?;

    // The MIC list trails the parameters.
    cur.expect(b'(')?;
    let n = cur.read_length()?;
    if !cur.match_token(n, b"hash") {
        return Err(KeywardError::InvalidSexp);
    }
    let n = cur.read_length()?;
    if !cur.match_token(n, b"sha1") {
        return Err(KeywardError::InvalidSexp);
    }
    let n = cur.read_length()?;
    if n != MIC_LEN {
        return Err(KeywardError::InvalidSexp);
    }
    let mut mic = [0u8; MIC_LEN];
    mic.copy_from_slice(cur.take(n)?);
    if !cur.at(b')') {
        return Err(KeywardError::InvalidSexp);
    }

    out.extend_from_slice(&cleartext[startpos..endpos]);

    // Skip the original (protected …) list and keep everything after it.
    let mut cur = SexpCursor::at_offset(protectedkey, replacepos);
    if !cur.at(b'(') {
        return Err(KeywardError::Bug);
    }
    cur.expect(b'(')?;
    cur.skip(1)?;
    let startpos = cur.pos();
    cur.skip(2)?; // close the algorithm list and the outer key list
    let endpos = cur.pos();
    if endpos == 0 || protectedkey[endpos - 1] != b')' {
        return Err(KeywardError::Bug);
    }
    out.extend_from_slice(&protectedkey[startpos..endpos]);

    Ok((out, mic))
}

/// Recovers the plaintext key from a protected canonical buffer.
///
/// Returns a freshly allocated `private-key` canonical buffer in secure
/// memory; a protect/unprotect round trip with the same passphrase
/// reproduces the original input byte for byte.
///
/// # Errors
///
/// `InvalidSexp`/`UnknownSexp` for malformed or foreign buffers,
/// `UnsupportedAlgorithm` and `UnsupportedProtection` for table misses,
/// `CorruptedProtection` for shape violations or a MIC mismatch,
/// `BadPassphrase` when the ciphertext does not decrypt into a well-formed
/// value, and `OutOfCore` when secure memory is exhausted.
pub fn unprotect(protectedkey: &[u8], passphrase: &[u8]) -> KeywardResult<SecureBuf> {
    let mut cur = SexpCursor::new(protectedkey);
    cur.expect(b'(')?;
    let n = cur.read_length()?;
    if !cur.match_token(n, b"protected-private-key") {
        return Err(KeywardError::UnknownSexp);
    }
    if !cur.at(b'(') {
        return Err(KeywardError::UnknownSexp);
    }
    cur.expect(b'(')?;
    let algo = cur.atom()?;
    AlgoInfo::lookup(algo).ok_or(KeywardError::UnsupportedAlgorithm)?;

    // Find the (protected …) list among the parameters.
    let prot_begin = loop {
        if !cur.at(b'(') {
            return Err(KeywardError::InvalidSexp);
        }
        let candidate = cur.pos();
        cur.expect(b'(')?;
        let n = cur.read_length()?;
        if cur.match_token(n, b"protected") {
            break candidate;
        }
        cur.advance(n)?;
        cur.skip(1)?;
    };

    let n = cur.read_length()?;
    if !cur.match_token(n, PROT_MODE.as_bytes()) {
        return Err(KeywardError::UnsupportedProtection);
    }
    if !cur.at(b'(') {
        return Err(KeywardError::InvalidSexp);
    }
    cur.expect(b'(')?;
    if !cur.at(b'(') {
        return Err(KeywardError::InvalidSexp);
    }
    cur.expect(b'(')?;
    let n = cur.read_length()?;
    if !cur.match_token(n, b"sha1") {
        return Err(KeywardError::UnsupportedProtection);
    }

    let n = cur
        .read_length()
        .map_err(|_| KeywardError::CorruptedProtection)?;
    if n != S2K_SALT_SIZE {
        return Err(KeywardError::CorruptedProtection);
    }
    let salt: &[u8; S2K_SALT_SIZE] = cur.take(n)?.try_into().map_err(|_| KeywardError::Bug)?;

    let n = cur
        .read_length()
        .map_err(|_| KeywardError::CorruptedProtection)?;
    let count_atom = cur.take(n)?;
    if !cur.at(b')') {
        return Err(KeywardError::InvalidSexp);
    }
    let count = parse_count(count_atom).ok_or(KeywardError::CorruptedProtection)?;
    cur.expect(b')')?;

    let n = cur
        .read_length()
        .map_err(|_| KeywardError::CorruptedProtection)?;
    if n != PROT_BLOCK_LEN {
        return Err(KeywardError::CorruptedProtection);
    }
    let iv = cur.take(n)?;
    if !cur.at(b')') {
        return Err(KeywardError::InvalidSexp);
    }
    cur.expect(b')')?;

    let n = cur.read_length()?;
    let ciphertext = cur.take(n)?;

    let cleartext = decrypt_region(ciphertext, passphrase, salt, count, iv)?;
    let (merged, stored_mic) = merge_lists(protectedkey, prot_begin, cleartext.as_slice())?;

    let mic = calculate_mic(merged.as_slice())?;
    if !bool::from(mic.ct_eq(&stored_mic)) {
        return Err(KeywardError::CorruptedProtection);
    }
    Ok(merged)
}

/// Parses the decimal iteration-count atom; `None` for junk, zero, or a
/// value that does not fit the one-octet S2K encoding.
fn parse_count(atom: &[u8]) -> Option<u32> {
    if atom.is_empty() || !atom.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let count: u32 = std::str::from_utf8(atom).ok()?.parse().ok()?;
    (count != 0 && count <= 0xFF).then_some(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operations::protect::protect;

    const PLAIN_KEY: &[u8] =
        b"(11:private-key(3:rsa(1:n1:x)(1:e1:y)(1:d1:z)(1:p1:a)(1:q1:b)(1:u1:c)))";

    #[test]
    fn test_roundtrip() -> KeywardResult<()> {
        let protected = protect(PLAIN_KEY, b"abc")?;
        let restored = unprotect(&protected, b"abc")?;
        assert_eq!(restored.as_slice(), PLAIN_KEY);
        Ok(())
    }

    #[test]
    fn test_wrong_passphrase() -> KeywardResult<()> {
        let protected = protect(PLAIN_KEY, b"abc")?;
        let result = unprotect(&protected, b"xyz");
        assert!(matches!(
            result,
            Err(KeywardError::BadPassphrase | KeywardError::CorruptedProtection)
        ));
        Ok(())
    }

    #[test]
    fn test_wrong_kind() {
        let result = unprotect(PLAIN_KEY, b"abc");
        assert!(matches!(result, Err(KeywardError::UnknownSexp)));
    }

    #[test]
    fn test_unsupported_protection_mode() {
        // Same shape as a real protected key, but an alien mode token.
        let key = b"(21:protected-private-key(3:rsa(1:n1:x)(1:e1:y)(9:protected13:pkcs5-aes-cbc((4:sha18:AAAAAAAA2:96)16:BBBBBBBBBBBBBBBB)16:CCCCCCCCCCCCCCCC)))";
        let result = unprotect(key, b"abc");
        assert!(matches!(result, Err(KeywardError::UnsupportedProtection)));
    }

    #[test]
    fn test_misaligned_ciphertext() {
        let key = b"(21:protected-private-key(3:rsa(1:n1:x)(1:e1:y)(9:protected25:openpgp-s2k3-sha1-aes-cbc((4:sha18:AAAAAAAA2:96)16:BBBBBBBBBBBBBBBB)5:CCCCC)))";
        let result = unprotect(key, b"abc");
        assert!(matches!(result, Err(KeywardError::CorruptedProtection)));
    }

    #[test]
    fn test_zero_count_rejected() {
        let key = b"(21:protected-private-key(3:rsa(1:n1:x)(1:e1:y)(9:protected25:openpgp-s2k3-sha1-aes-cbc((4:sha18:AAAAAAAA1:0)16:BBBBBBBBBBBBBBBB)16:CCCCCCCCCCCCCCCC)))";
        let result = unprotect(key, b"abc");
        assert!(matches!(result, Err(KeywardError::CorruptedProtection)));
    }

    #[test]
    fn test_bad_salt_length() {
        let key = b"(21:protected-private-key(3:rsa(1:n1:x)(1:e1:y)(9:protected25:openpgp-s2k3-sha1-aes-cbc((4:sha14:AAAA2:96)16:BBBBBBBBBBBBBBBB)16:CCCCCCCCCCCCCCCC)))";
        let result = unprotect(key, b"abc");
        assert!(matches!(result, Err(KeywardError::CorruptedProtection)));
    }

    #[test]
    fn test_tampered_ciphertext() -> KeywardResult<()> {
        let mut protected = protect(PLAIN_KEY, b"abc")?;
        // The ciphertext is the run of bytes just before the final close
        // paren; flip a bit in its first block.
        let cipher_start = protected.len() - 1 - 80;
        protected[cipher_start] ^= 0x01;
        let result = unprotect(&protected, b"abc");
        assert!(matches!(
            result,
            Err(KeywardError::BadPassphrase | KeywardError::CorruptedProtection)
        ));
        Ok(())
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(b"96"), Some(96));
        assert_eq!(parse_count(b"255"), Some(255));
        assert_eq!(parse_count(b"0"), None);
        assert_eq!(parse_count(b""), None);
        assert_eq!(parse_count(b"96x"), None);
        assert_eq!(parse_count(b"256"), None);
        assert_eq!(parse_count(b"99999999999"), None);
    }

    #[test]
    fn test_oversized_count_rejected() {
        // A count atom outside the one-octet encoding must be rejected
        // before key derivation, not spun on.
        let key = b"(21:protected-private-key(3:rsa(1:n1:x)(1:e1:y)(9:protected25:openpgp-s2k3-sha1-aes-cbc((4:sha18:AAAAAAAA4:1000)16:BBBBBBBBBBBBBBBB)16:CCCCCCCCCCCCCCCC)))";
        let result = unprotect(key, b"abc");
        assert!(matches!(result, Err(KeywardError::CorruptedProtection)));
    }
}
