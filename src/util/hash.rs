//! Hashing utilities for fingerprints and archive digests.

use std::fmt;
use std::path::Path;

use sha2::{Digest, Sha256};

/// djb2 over the bytes of `s`.
pub fn djb2(s: &str) -> u64 {
    s.bytes().fold(5381u64, |hash, byte| {
        hash.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

/// Identity of an installation slot.
///
/// Derived from the install path string, not from file contents: two
/// installs into the same directory share a fingerprint even when the
/// bytes differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint an install path.
    pub fn of_path(path: &Path) -> Self {
        Fingerprint(djb2(&path.to_string_lossy()).to_string())
    }

    /// Wrap an already computed fingerprint, e.g. one read from the ledger.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Fingerprint(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
