//! Strong content hashing for cache keys.

use std::fmt;

use xxhash_rust::xxh3::{xxh3_128, xxh3_128_with_seed};

/// 128-bit content hash used as the sole cache key.
///
/// At this width collisions are treated as impossible: the cache performs no
/// fallback comparison of the hashed content.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrongHash([u8; 16]);

impl StrongHash {
    /// Hashes an arbitrary byte range.
    pub fn compute(data: &[u8]) -> Self {
        Self(xxh3_128(data).to_le_bytes())
    }

    /// Hashes a byte range with a caller-chosen seed, for deriving distinct
    /// key spaces from the same content (e.g. per-slice image hashes).
    pub fn compute_with_seed(data: &[u8], seed: u64) -> Self {
        Self(xxh3_128_with_seed(data, seed).to_le_bytes())
    }

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for StrongHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for StrongHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StrongHash({})", self)
    }
}
