//! crates/checksums/src/strong/mod.rs
//! Strong digests used to verify weak-checksum candidates.
//!
//! Every algorithm implements [`StrongDigest`], which gives the block matcher
//! a uniform streaming interface and a fixed output length. Callers that only
//! keep a prefix of the digest use [`truncated`].

mod md4;
mod md5;
mod sha1;
mod xxh3;

pub use md4::Md4;
pub use md5::Md5;
pub use sha1::Sha1;
pub use xxh3::Xxh3_128;

/// Streaming strong digest with a fixed output length.
///
/// # Examples
///
/// ```
/// use checksums::strong::{Md5, StrongDigest};
///
/// let mut hasher = Md5::with_seed(());
/// hasher.update(b"block ");
/// hasher.update(b"data");
/// assert_eq!(hasher.finalize(), Md5::digest(b"block data"));
/// ```
pub trait StrongDigest: Sized {
    /// Seed material mixed into the initial state.
    type Seed: Default;
    /// Finalised digest bytes.
    type Digest: AsRef<[u8]> + Copy + Eq;
    /// Length of [`Self::Digest`] in bytes.
    const DIGEST_LEN: usize;

    /// Creates a hasher primed with `seed`.
    fn with_seed(seed: Self::Seed) -> Self;

    /// Feeds additional bytes into the digest state.
    fn update(&mut self, data: &[u8]);

    /// Finalises the digest.
    fn finalize(self) -> Self::Digest;

    /// Computes the digest of `data` with the default seed.
    #[must_use]
    fn digest(data: &[u8]) -> Self::Digest {
        let mut hasher = Self::with_seed(Self::Seed::default());
        hasher.update(data);
        hasher.finalize()
    }
}

/// Computes the digest of `data` and keeps its first `len` bytes.
///
/// `len` is clamped to [`StrongDigest::DIGEST_LEN`].
///
/// ```
/// use checksums::strong::{Sha1, truncated};
///
/// assert_eq!(truncated::<Sha1>(b"abc", 4), vec![0xa9, 0x99, 0x3e, 0x36]);
/// ```
#[must_use]
pub fn truncated<D: StrongDigest>(data: &[u8], len: usize) -> Vec<u8> {
    let digest = D::digest(data);
    let bytes = digest.as_ref();
    bytes[..len.min(bytes.len())].to_vec()
}

#[cfg(test)]
pub(crate) fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut out, "{byte:02x}").expect("write! to String cannot fail");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_clamps_to_digest_len() {
        assert_eq!(truncated::<Md4>(b"abc", 64).len(), Md4::DIGEST_LEN);
        assert_eq!(truncated::<Md4>(b"abc", 0), Vec::<u8>::new());
    }

    #[test]
    fn truncated_is_a_prefix_of_the_full_digest() {
        let full = Md5::digest(b"prefix");
        assert_eq!(truncated::<Md5>(b"prefix", 6), full[..6].to_vec());
    }

    #[test]
    fn digest_lengths() {
        assert_eq!(Md4::DIGEST_LEN, 16);
        assert_eq!(Md5::DIGEST_LEN, 16);
        assert_eq!(Sha1::DIGEST_LEN, 20);
        assert_eq!(Xxh3_128::DIGEST_LEN, 16);
    }
}
