//! Classification of canonical key objects.

use core::fmt::{self, Display};

use crate::core::sexp::SexpCursor;

/// The kind of key a canonical buffer represents.
///
/// Classification looks only at the top atom; it never allocates and cannot
/// fail. Anything unrecognized is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Not a recognizable key object.
    Unknown,
    /// A plaintext `private-key`.
    Plain,
    /// A passphrase-protected `protected-private-key`.
    Protected,
    /// A `shadowed-private-key` whose secret lives elsewhere.
    Shadowed,
}

impl KeyKind {
    /// Classifies a canonical buffer by its top atom.
    #[must_use]
    pub fn classify(buf: &[u8]) -> KeyKind {
        let mut cur = SexpCursor::new(buf);
        if cur.expect(b'(').is_err() {
            return KeyKind::Unknown;
        }
        let Ok(n) = cur.read_length() else {
            return KeyKind::Unknown;
        };
        if cur.match_token(n, b"protected-private-key") {
            KeyKind::Protected
        } else if cur.match_token(n, b"shadowed-private-key") {
            KeyKind::Shadowed
        } else if cur.match_token(n, b"private-key") {
            KeyKind::Plain
        } else {
            KeyKind::Unknown
        }
    }
}

impl Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyKind::Unknown => "unknown",
            KeyKind::Plain => "plain",
            KeyKind::Protected => "protected",
            KeyKind::Shadowed => "shadowed",
        };
        write!(f, "{name}")
    }
}
