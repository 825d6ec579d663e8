//! crates/checksums/src/strong/xxh3.rs
//!
//! 128-bit XXH3, a fast non-cryptographic alternative to MD4 for signatures
//! where collision resistance against an adversary is not required.

use super::StrongDigest;

/// Streaming XXH3 hasher producing 128-bit digests.
///
/// The digest is the little-endian encoding of the 128-bit hash value.
///
/// ```
/// use checksums::strong::Xxh3_128;
///
/// let mut hasher = Xxh3_128::new(0);
/// hasher.update(b"chunk 1");
/// hasher.update(b"chunk 2");
/// assert_eq!(hasher.finalize(), Xxh3_128::digest(0, b"chunk 1chunk 2"));
/// ```
#[derive(Clone)]
pub struct Xxh3_128 {
    inner: xxhash_rust::xxh3::Xxh3,
}

impl std::fmt::Debug for Xxh3_128 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Xxh3_128").finish_non_exhaustive()
    }
}

impl Xxh3_128 {
    /// Creates a hasher with the supplied seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: xxhash_rust::xxh3::Xxh3::with_seed(seed),
        }
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalises the digest and returns the little-endian 128-bit output.
    #[must_use]
    pub fn finalize(self) -> [u8; 16] {
        self.inner.digest128().to_le_bytes()
    }

    /// Computes the digest of `data` with `seed` in one shot.
    #[must_use]
    pub fn digest(seed: u64, data: &[u8]) -> [u8; 16] {
        xxhash_rust::xxh3::xxh3_128_with_seed(data, seed).to_le_bytes()
    }
}

impl StrongDigest for Xxh3_128 {
    type Seed = u64;
    type Digest = [u8; 16];
    const DIGEST_LEN: usize = 16;

    fn with_seed(seed: Self::Seed) -> Self {
        Xxh3_128::new(seed)
    }

    fn update(&mut self, data: &[u8]) {
        self.update(data);
    }

    fn finalize(self) -> Self::Digest {
        self.finalize()
    }
}
