//! crates/checksums/src/rolling/digest.rs

use super::checksum::RollingChecksum;

/// Digest produced by the rolling checksum.
///
/// Captures both 16-bit components together with the number of bytes that
/// produced them, so a [`RollingChecksum`] can be resumed from it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct RollingDigest {
    s1: u16,
    s2: u16,
    len: usize,
}

impl RollingDigest {
    /// Creates a digest from individual components.
    #[must_use]
    pub const fn new(sum1: u16, sum2: u16, len: usize) -> Self {
        Self {
            s1: sum1,
            s2: sum2,
            len,
        }
    }

    /// Computes the digest of `window` in a single pass.
    #[must_use]
    pub fn from_bytes(window: &[u8]) -> Self {
        let mut checksum = RollingChecksum::new();
        checksum.update(window);
        checksum.digest()
    }

    /// Returns the first checksum component (sum of bytes).
    #[must_use]
    pub const fn sum1(&self) -> u16 {
        self.s1
    }

    /// Returns the second checksum component (sum of prefix sums).
    #[must_use]
    pub const fn sum2(&self) -> u16 {
        self.s2
    }

    /// Returns the number of bytes that contributed to the digest.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when no bytes contributed to the digest.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the checksum in rsync's packed 32-bit representation.
    #[must_use]
    pub const fn value(&self) -> u32 {
        ((self.s2 as u32) << 16) | (self.s1 as u32)
    }
}

impl From<RollingChecksum> for RollingDigest {
    #[inline]
    fn from(checksum: RollingChecksum) -> Self {
        checksum.digest()
    }
}

impl From<&RollingChecksum> for RollingDigest {
    #[inline]
    fn from(checksum: &RollingChecksum) -> Self {
        checksum.digest()
    }
}

impl From<RollingDigest> for u32 {
    #[inline]
    fn from(digest: RollingDigest) -> Self {
        digest.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_zero_value() {
        let digest = RollingDigest::from_bytes(&[]);
        assert!(digest.is_empty());
        assert_eq!(digest.value(), 0);
    }

    #[test]
    fn packs_sum2_in_high_half() {
        let digest = RollingDigest::new(0x1234, 0xabcd, 3);
        assert_eq!(digest.value(), 0xabcd_1234);
        assert_eq!(u32::from(digest), 0xabcd_1234);
    }

    #[test]
    fn known_input_matches_hand_computation() {
        // s1 = 1 + 2 + 3 = 6, s2 = 1 + 3 + 6 = 10
        let digest = RollingDigest::from_bytes(&[1, 2, 3]);
        assert_eq!(digest.sum1(), 6);
        assert_eq!(digest.sum2(), 10);
        assert_eq!(digest.len(), 3);
    }

    #[test]
    fn conversion_from_checksum_preserves_state() {
        let mut checksum = RollingChecksum::new();
        checksum.update(b"delta");
        assert_eq!(RollingDigest::from(&checksum), checksum.digest());
        assert_eq!(RollingDigest::from(checksum.clone()), RollingDigest::from_bytes(b"delta"));
    }
}
