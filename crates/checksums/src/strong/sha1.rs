use digest::Digest;

use super::StrongDigest;

/// Streaming SHA-1 hasher.
#[derive(Clone, Default)]
pub struct Sha1 {
    inner: sha1::Sha1,
}

impl std::fmt::Debug for Sha1 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Sha1")
    }
}

impl Sha1 {
    /// Creates a hasher with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: sha1::Sha1::new(),
        }
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    /// Finalises the digest and returns the 160-bit SHA-1 output.
    #[must_use]
    pub fn finalize(self) -> [u8; 20] {
        self.inner.finalize().into()
    }

    /// Computes the SHA-1 digest for `data` in one shot.
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; 20] {
        <Self as StrongDigest>::digest(data)
    }
}

impl StrongDigest for Sha1 {
    type Seed = ();
    type Digest = [u8; 20];
    const DIGEST_LEN: usize = 20;

    fn with_seed((): Self::Seed) -> Self {
        Sha1::new()
    }

    fn update(&mut self, data: &[u8]) {
        self.update(data);
    }

    fn finalize(self) -> Self::Digest {
        self.finalize()
    }
}
