//! Shadow-key transform.
//!
//! A shadowed key is a public key rewritten into private-key shape, with a
//! `(shadowed PROTOCOL LOCATOR)` list in place of the secret parameters. The
//! locator is an opaque canonical value naming where the secret actually
//! lives (typically a smart card); this module never interprets it.

use crate::core::error::{KeywardError, KeywardResult};
use crate::core::sexp::{canon_len, SexpCursor};

/// Shadow protocol token for card-backed keys.
pub const SHADOW_PROTOCOL: &str = "t1-v1";

/// Rewrites a canonical `public-key` into a `shadowed-private-key` carrying
/// `shadow_info` as its locator.
///
/// Both inputs must be complete canonical values; the locator is embedded
/// verbatim.
///
/// # Errors
///
/// `InvalidValue` when either buffer has no canonical length, `InvalidSexp`
/// for structural damage, `UnknownSexp` when `pubkey` is not a `public-key`.
pub fn shadow_key(pubkey: &[u8], shadow_info: &[u8]) -> KeywardResult<Vec<u8>> {
    let pubkey_len = canon_len(pubkey);
    let info_len = canon_len(shadow_info);
    if pubkey_len == 0 || info_len == 0 {
        return Err(KeywardError::InvalidValue);
    }

    let mut cur = SexpCursor::new(pubkey);
    cur.expect(b'(')?;
    let n = cur.read_length()?;
    if !cur.match_token(n, b"public-key") {
        return Err(KeywardError::UnknownSexp);
    }
    let body_start = cur.pos();
    if !cur.at(b'(') {
        return Err(KeywardError::UnknownSexp);
    }
    cur.expect(b'(')?;
    let n = cur.read_length()?;
    cur.advance(n)?; // algorithm name

    while !cur.at(b')') {
        cur.expect(b'(')?;
        let n = cur.read_length()?;
        cur.advance(n)?;
        let n = cur.read_length()?;
        cur.advance(n)?;
        cur.expect(b')')?;
    }
    // Insert right before the close of the algorithm list.
    let point = cur.pos();

    let mut out = Vec::with_capacity(
        24 + (point - body_start) + 18 + info_len + 1 + (pubkey_len - point),
    );
    out.extend_from_slice(b"(20:shadowed-private-key");
    out.extend_from_slice(&pubkey[body_start..point]);
    out.extend_from_slice(b"(8:shadowed5:t1-v1");
    out.extend_from_slice(&shadow_info[..info_len]);
    out.push(b')');
    out.extend_from_slice(&pubkey[point..pubkey_len]);
    Ok(out)
}

/// Returns the locator embedded in a canonical `shadowed-private-key`.
///
/// The returned slice borrows from `shadowkey` and spans exactly the
/// locator's canonical bytes.
///
/// # Errors
///
/// `InvalidSexp`/`UnknownSexp` for malformed or foreign buffers, and
/// `UnsupportedProtocol` when the shadow protocol is not `t1-v1`.
pub fn get_shadow_info(shadowkey: &[u8]) -> KeywardResult<&[u8]> {
    let mut cur = SexpCursor::new(shadowkey);
    cur.expect(b'(')?;
    let n = cur.read_length()?;
    if !cur.match_token(n, b"shadowed-private-key") {
        return Err(KeywardError::UnknownSexp);
    }
    if !cur.at(b'(') {
        return Err(KeywardError::UnknownSexp);
    }
    cur.expect(b'(')?;
    let n = cur.read_length()?;
    cur.advance(n)?; // algorithm name

    loop {
        if cur.at(b')') {
            return Err(KeywardError::UnknownSexp);
        }
        cur.expect(b'(')?;
        let n = cur.read_length()?;
        if cur.match_token(n, b"shadowed") {
            break;
        }
        cur.advance(n)?;
        let n = cur.read_length()?;
        cur.advance(n)?;
        cur.expect(b')')?;
    }

    let n = cur.read_length()?;
    if !cur.match_token(n, SHADOW_PROTOCOL.as_bytes()) {
        return Err(KeywardError::UnsupportedProtocol);
    }
    if !cur.at(b'(') {
        return Err(KeywardError::InvalidSexp);
    }
    let start = cur.pos();
    let len = canon_len(&shadowkey[start..]);
    if len == 0 {
        return Err(KeywardError::InvalidSexp);
    }
    Ok(&shadowkey[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::KeyKind;

    const PUBLIC_KEY: &[u8] = b"(10:public-key(3:rsa(1:n1:x)(1:e1:y)))";
    const SHADOW_INFO: &[u8] = b"(8:card-s/n5:12345)";

    #[test]
    fn test_shadow_shape() -> KeywardResult<()> {
        let shadowed = shadow_key(PUBLIC_KEY, SHADOW_INFO)?;
        assert_eq!(
            shadowed,
            b"(20:shadowed-private-key(3:rsa(1:n1:x)(1:e1:y)(8:shadowed5:t1-v1(8:card-s/n5:12345))))"
        );
        assert_eq!(KeyKind::classify(&shadowed), KeyKind::Shadowed);
        assert_eq!(canon_len(&shadowed), shadowed.len());
        Ok(())
    }

    #[test]
    fn test_shadow_info_roundtrip() -> KeywardResult<()> {
        let shadowed = shadow_key(PUBLIC_KEY, SHADOW_INFO)?;
        assert_eq!(get_shadow_info(&shadowed)?, SHADOW_INFO);
        Ok(())
    }

    #[test]
    fn test_shadow_rejects_non_public() {
        let result = shadow_key(b"(11:private-key(3:rsa(1:n1:x)))", SHADOW_INFO);
        assert!(matches!(result, Err(KeywardError::UnknownSexp)));
    }

    #[test]
    fn test_shadow_rejects_malformed_inputs() {
        let result = shadow_key(b"not-canonical", SHADOW_INFO);
        assert!(matches!(result, Err(KeywardError::InvalidValue)));

        let result = shadow_key(PUBLIC_KEY, b"not-canonical");
        assert!(matches!(result, Err(KeywardError::InvalidValue)));
    }

    #[test]
    fn test_get_shadow_info_unsupported_protocol() {
        let key = b"(20:shadowed-private-key(3:rsa(1:n1:x)(8:shadowed5:t9-v9(3:abc))))";
        let result = get_shadow_info(key);
        assert!(matches!(result, Err(KeywardError::UnsupportedProtocol)));
    }

    #[test]
    fn test_get_shadow_info_missing_list() {
        let key = b"(20:shadowed-private-key(3:rsa(1:n1:x)))";
        let result = get_shadow_info(key);
        assert!(matches!(result, Err(KeywardError::UnknownSexp)));
    }
}
