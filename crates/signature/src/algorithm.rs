//! crates/signature/src/algorithm.rs
//!
//! Strong checksum algorithm definitions for signature generation.

use checksums::strong::{Md4, Md5, Sha1, StrongDigest, Xxh3_128};

/// Strong checksum strategies supported by the signature generator.
///
/// Each variant owns a distinct signature magic number so a serialized
/// signature names the algorithm that produced it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SignatureAlgorithm {
    /// MD4, the default.
    #[default]
    Md4,
    /// MD5.
    Md5,
    /// SHA-1.
    Sha1,
    /// XXH3/128 with seed zero.
    Xxh3_128,
}

impl SignatureAlgorithm {
    /// Every supported algorithm, in magic-number order.
    pub const ALL: [Self; 4] = [Self::Md4, Self::Md5, Self::Sha1, Self::Xxh3_128];

    /// Returns the signature magic number that identifies the algorithm.
    #[inline]
    #[must_use]
    pub const fn magic(self) -> u32 {
        match self {
            Self::Md4 => 0x7273_0136,
            Self::Md5 => 0x7273_0156,
            Self::Sha1 => 0x7273_0166,
            Self::Xxh3_128 => 0x7273_0176,
        }
    }

    /// Looks up the algorithm for a signature magic number.
    #[must_use]
    pub const fn from_magic(magic: u32) -> Option<Self> {
        match magic {
            0x7273_0136 => Some(Self::Md4),
            0x7273_0156 => Some(Self::Md5),
            0x7273_0166 => Some(Self::Sha1),
            0x7273_0176 => Some(Self::Xxh3_128),
            _ => None,
        }
    }

    /// Returns the full digest width produced by the algorithm in bytes.
    #[inline]
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Md4 => Md4::DIGEST_LEN,
            Self::Md5 => Md5::DIGEST_LEN,
            Self::Sha1 => Sha1::DIGEST_LEN,
            Self::Xxh3_128 => Xxh3_128::DIGEST_LEN,
        }
    }

    /// Returns a lowercase name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md4 => "md4",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Xxh3_128 => "xxh3-128",
        }
    }

    /// Computes a strong digest truncated to `len` bytes.
    ///
    /// Requests longer than [`digest_len`](Self::digest_len) return the full digest.
    pub fn compute_truncated(self, data: &[u8], len: usize) -> Vec<u8> {
        fn prefix<D: AsRef<[u8]>>(digest: D, len: usize) -> Vec<u8> {
            let bytes = digest.as_ref();
            bytes[..len.min(bytes.len())].to_vec()
        }

        match self {
            Self::Md4 => prefix(Md4::digest(data), len),
            Self::Md5 => prefix(Md5::digest(data), len),
            Self::Sha1 => prefix(Sha1::digest(data), len),
            Self::Xxh3_128 => prefix(<Xxh3_128 as StrongDigest>::digest(data), len),
        }
    }
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
