//! Content hashing for change detection and cheap configuration fingerprints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::path::Path;

/// A 128-bit content hash computed using XXH3.
///
/// Two files with the same `ContentHash` are assumed to have identical content.
/// Used by the build data store to detect which resource files changed since
/// the previous build.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// A lossy 32-bit summary used to decide whether expensive work can be skipped.
///
/// Fingerprints are combined with wrapping addition, so the order in which
/// parts are added does not matter and collisions are possible. Equal
/// fingerprints are a necessary, not a sufficient, condition for "unchanged".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Fingerprint(u32);

impl Fingerprint {
    /// The fingerprint of nothing.
    pub const ZERO: Fingerprint = Fingerprint(0);

    /// Creates a fingerprint from a raw value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Hashes a string.
    pub fn of_str(s: &str) -> Self {
        Self(xxhash_rust::xxh3::xxh3_64(s.as_bytes()) as u32)
    }

    /// Hashes a path by its identity, with separators normalized to `/`.
    pub fn of_path(path: &Path) -> Self {
        let normalized = path.to_string_lossy().replace('\\', "/");
        Self::of_str(&normalized)
    }

    /// Adds another fingerprint to this one (wrapping).
    pub fn combine(self, other: Fingerprint) -> Self {
        Self(self.0.wrapping_add(other.0))
    }

    /// Parses the lower-case hex form produced by [`Display`](fmt::Display).
    pub fn from_hex(s: &str) -> Option<Self> {
        u32::from_str_radix(s.trim(), 16).ok().map(Self)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl Sum for Fingerprint {
    fn sum<I: Iterator<Item = Fingerprint>>(iter: I) -> Self {
        iter.fold(Fingerprint::ZERO, Fingerprint::combine)
    }
}
