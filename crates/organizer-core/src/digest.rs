//! # Hash Values
//!
//! `Hash32` is the fixed-width output of SHA-256. Leaves, commitment
//! roots and Merkle siblings are all `Hash32` values on the wire.

use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A 32-byte SHA-256 output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash32(pub [u8; 32]);

impl_hex32!(Hash32);

impl Hash32 {
    /// The all-zero hash.
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    /// SHA-256 over the concatenation of `parts`.
    ///
    /// Callers are responsible for domain separation; every caller in the
    /// workspace starts `parts` with a one-byte tag.
    pub fn sha256_concat(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }
}

/// SHA-256 of canonical bytes.
///
/// Accepts only `&CanonicalBytes`, so any digest of a structured payload
/// has gone through canonicalization first.
pub fn sha256_digest(data: &CanonicalBytes) -> Hash32 {
    Hash32::sha256_concat(&[data.as_bytes()])
}
