//! Algorithm descriptors for protectable keys.
//!
//! The protection encoder needs to know, per algorithm, the order of the
//! key's parameter lists and which contiguous run of them carries secret
//! material. That knowledge lives in one immutable table so that adding an
//! algorithm is a one-line change.

/// Per-algorithm description of a private key's parameter layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgoInfo {
    /// Algorithm name as it appears in the key (e.g. `rsa`).
    pub name: &'static str,
    /// Single-character parameter names in on-wire order.
    pub parmlist: &'static str,
    /// Index into `parmlist` of the first protected parameter.
    pub prot_from: usize,
    /// Index into `parmlist` of the last protected parameter, inclusive.
    pub prot_to: usize,
}

const PROTECT_INFO: &[AlgoInfo] = &[AlgoInfo {
    name: "rsa",
    parmlist: "nedpqu",
    prot_from: 2,
    prot_to: 5,
}];

impl AlgoInfo {
    /// Looks up the descriptor for an algorithm name read off the wire.
    #[must_use]
    pub fn lookup(name: &[u8]) -> Option<&'static AlgoInfo> {
        PROTECT_INFO.iter().find(|info| info.name.as_bytes() == name)
    }
}
