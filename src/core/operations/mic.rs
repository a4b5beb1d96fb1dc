//! Message integrity code over a plaintext private key.
//!
//! The MIC is a SHA-1 digest of the exact bytes of the inner list
//! `(ALGO (p1 V1) … (pN VN))`, both parentheses included, as they sit in the
//! canonical buffer. It is stored alongside the encrypted parameters and
//! recomputed after decryption to detect any change to the reassembled key.

use sha1::{Digest, Sha1};

use crate::core::error::{KeywardError, KeywardResult};
use crate::core::sexp::SexpCursor;

/// MIC length in bytes (SHA-1).
pub const MIC_LEN: usize = 20;

/// Computes the MIC of a plaintext `private-key` canonical buffer.
///
/// Works for any algorithm: the walk only requires that each parameter is a
/// two-atom list.
///
/// # Errors
///
/// Returns `InvalidSexp` for structural damage and `UnknownSexp` when the
/// buffer is not a `private-key`.
pub fn calculate_mic(plainkey: &[u8]) -> KeywardResult<[u8; MIC_LEN]> {
    let mut cur = SexpCursor::new(plainkey);
    cur.expect(b'(')?;
    let n = cur.read_length()?;
    if !cur.match_token(n, b"private-key") {
        return Err(KeywardError::UnknownSexp);
    }
    if !cur.at(b'(') {
        return Err(KeywardError::UnknownSexp);
    }
    let hash_begin = cur.pos();
    cur.expect(b'(')?;
    let n = cur.read_length()?;
    cur.advance(n)?; // algorithm name

    while cur.at(b'(') {
        cur.expect(b'(')?;
        let n = cur.read_length()?;
        cur.advance(n)?;
        let n = cur.read_length()?;
        cur.advance(n)?;
        cur.expect(b')')?;
    }
    cur.expect(b')')?;
    let hash_end = cur.pos();

    Ok(Sha1::digest(&plainkey[hash_begin..hash_end]).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_KEY: &[u8] =
        b"(11:private-key(3:rsa(1:n1:x)(1:e1:y)(1:d1:z)(1:p1:a)(1:q1:b)(1:u1:c)))";

    #[test]
    fn test_mic_covers_inner_list_bytes() -> KeywardResult<()> {
        let mic = calculate_mic(PLAIN_KEY)?;

        // The inner list starts right after "(11:private-key" and runs to the
        // matching close paren.
        let inner = &PLAIN_KEY[15..PLAIN_KEY.len() - 1];
        assert!(inner.starts_with(b"(3:rsa"));
        assert!(inner.ends_with(b"(1:u1:c))"));
        assert_eq!(mic, <[u8; MIC_LEN]>::from(Sha1::digest(inner)));
        Ok(())
    }

    #[test]
    fn test_mic_changes_with_parameter_value() -> KeywardResult<()> {
        let mut altered = PLAIN_KEY.to_vec();
        let pos = PLAIN_KEY
            .windows(3)
            .position(|w| w == b"1:x")
            .expect("n value present");
        altered[pos + 2] = b'X';

        assert_ne!(calculate_mic(PLAIN_KEY)?, calculate_mic(&altered)?);
        Ok(())
    }

    #[test]
    fn test_mic_rejects_other_kinds() {
        let result = calculate_mic(b"(10:public-key(3:rsa(1:n1:x)))");
        assert!(matches!(result, Err(KeywardError::UnknownSexp)));
    }

    #[test]
    fn test_mic_rejects_damage() {
        let result = calculate_mic(b"(11:private-key(3:rsa(1:n1:x)");
        assert!(matches!(result, Err(KeywardError::InvalidSexp)));

        let result = calculate_mic(b"garbage");
        assert!(matches!(result, Err(KeywardError::InvalidSexp)));
    }
}
