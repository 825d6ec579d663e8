//! crates/signature/src/layout.rs
//!
//! Block and strong-digest sizing.
//!
//! Without a basis size hint the layout falls back to fixed defaults. With a
//! hint the block length grows with the square root of the basis length
//! (rounded down to a power-of-two mix, never below 700 bytes and never above
//! 128 KiB) and the strong digest length grows with the number of blocks so
//! that the chance of an undetected collision stays low.

use thiserror::Error;

use crate::algorithm::SignatureAlgorithm;

/// Block length used when neither a block length nor a basis size hint is supplied.
pub const DEFAULT_BLOCK_LEN: u32 = 2048;
/// Strong digest length used when neither a digest length nor a basis size hint is supplied.
pub const DEFAULT_STRONG_LEN: u32 = 8;
/// Largest block length accepted from callers.
pub const MAX_BLOCK_LEN: u32 = 1 << 29;

/// Smallest block length chosen by the size heuristic.
const BLOCK_SIZE: u32 = 700;
/// Largest block length chosen by the size heuristic.
const MAX_HEURISTIC_BLOCK_LEN: u32 = 1 << 17;
/// Bias applied when computing strong checksum lengths for larger bases.
const BLOCKSUM_BIAS: i32 = 10;
/// Shortest strong digest chosen by the size heuristic.
const MIN_STRONG_LEN: u32 = 4;

/// Caller preferences for a signature.
///
/// Unset lengths are derived by [`resolve_layout`]. A length of zero counts as
/// unset.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SignatureOptions {
    block_len: Option<u32>,
    strong_len: Option<u32>,
    algorithm: SignatureAlgorithm,
    basis_len_hint: Option<u64>,
}

impl SignatureOptions {
    /// Options with every value derived.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            block_len: None,
            strong_len: None,
            algorithm: SignatureAlgorithm::Md4,
            basis_len_hint: None,
        }
    }

    /// Forces the block length.
    #[must_use]
    pub const fn with_block_len(mut self, block_len: u32) -> Self {
        self.block_len = Some(block_len);
        self
    }

    /// Forces the strong digest length.
    #[must_use]
    pub const fn with_strong_len(mut self, strong_len: u32) -> Self {
        self.strong_len = Some(strong_len);
        self
    }

    /// Selects the strong checksum algorithm.
    #[must_use]
    pub const fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Supplies the expected basis length for the sizing heuristic.
    #[must_use]
    pub const fn with_basis_len_hint(mut self, len: u64) -> Self {
        self.basis_len_hint = Some(len);
        self
    }

    /// Returns the forced block length, if any.
    #[must_use]
    pub const fn block_len(&self) -> Option<u32> {
        self.block_len
    }

    /// Returns the forced strong digest length, if any.
    #[must_use]
    pub const fn strong_len(&self) -> Option<u32> {
        self.strong_len
    }

    /// Returns the selected algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Returns the basis length hint, if any.
    #[must_use]
    pub const fn basis_len_hint(&self) -> Option<u64> {
        self.basis_len_hint
    }
}

/// Resolved parameters of a signature: algorithm, block length and strong digest length.
///
/// Constructed through [`SignatureLayout::new`] or [`resolve_layout`], both of
/// which guarantee `block_len` in `1..=MAX_BLOCK_LEN` and `strong_len` in
/// `1..=digest_len`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SignatureLayout {
    algorithm: SignatureAlgorithm,
    block_len: u32,
    strong_len: u32,
}

impl SignatureLayout {
    /// Validates and builds a layout.
    pub fn new(
        algorithm: SignatureAlgorithm,
        block_len: u32,
        strong_len: u32,
    ) -> Result<Self, LayoutError> {
        if block_len == 0 {
            return Err(LayoutError::ZeroBlockLength);
        }
        if block_len > MAX_BLOCK_LEN {
            return Err(LayoutError::BlockLengthTooLarge {
                len: block_len,
                max: MAX_BLOCK_LEN,
            });
        }
        if strong_len == 0 {
            return Err(LayoutError::ZeroStrongLength);
        }
        if strong_len as usize > algorithm.digest_len() {
            return Err(LayoutError::StrongLengthTooLong {
                requested: strong_len,
                algorithm,
            });
        }
        Ok(Self {
            algorithm,
            block_len,
            strong_len,
        })
    }

    /// Returns the strong checksum algorithm.
    #[inline]
    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Returns the block length in bytes.
    #[inline]
    #[must_use]
    pub const fn block_len(&self) -> u32 {
        self.block_len
    }

    /// Returns the truncated strong digest length in bytes.
    #[inline]
    #[must_use]
    pub const fn strong_len(&self) -> u32 {
        self.strong_len
    }

    /// Returns the signature magic number of the algorithm.
    #[inline]
    #[must_use]
    pub const fn magic(&self) -> u32 {
        self.algorithm.magic()
    }

    /// Number of blocks a basis of `basis_len` bytes is split into.
    #[must_use]
    pub const fn block_count(&self, basis_len: u64) -> u64 {
        basis_len.div_ceil(self.block_len as u64)
    }
}

/// Errors produced when resolving signature parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum LayoutError {
    /// A block length of zero was requested.
    #[error("block length must be positive")]
    ZeroBlockLength,
    /// The requested block length exceeds [`MAX_BLOCK_LEN`].
    #[error("block length {len} exceeds the maximum of {max}")]
    BlockLengthTooLarge {
        /// Requested block length.
        len: u32,
        /// Largest accepted block length.
        max: u32,
    },
    /// A strong digest length of zero was requested.
    #[error("strong checksum length must be positive")]
    ZeroStrongLength,
    /// The requested strong digest length exceeds the algorithm's digest width.
    #[error("requested strong checksum length {requested} exceeds {algorithm} digest width")]
    StrongLengthTooLong {
        /// Number of bytes requested.
        requested: u32,
        /// Strong checksum algorithm in use.
        algorithm: SignatureAlgorithm,
    },
    /// The basis size hint exceeds [`i64::MAX`].
    #[error("basis length {length} exceeds i64::MAX")]
    BasisTooLarge {
        /// Hinted basis length.
        length: u64,
    },
}

impl From<LayoutError> for streaming::JobError {
    fn from(error: LayoutError) -> Self {
        Self::InvalidParameters(error.to_string())
    }
}

/// Resolves caller preferences into a concrete [`SignatureLayout`].
#[doc(alias = "sum_sizes_sqroot")]
pub fn resolve_layout(options: SignatureOptions) -> Result<SignatureLayout, LayoutError> {
    let hint = options.basis_len_hint();
    if let Some(length) = hint {
        if length > i64::MAX as u64 {
            return Err(LayoutError::BasisTooLarge { length });
        }
    }

    let algorithm = options.algorithm();
    let digest_len = algorithm.digest_len() as u32;

    let block_len = match options.block_len().filter(|&len| len != 0) {
        Some(len) => len,
        None => hint.map_or(DEFAULT_BLOCK_LEN, derive_block_length),
    };

    let strong_len = match options.strong_len().filter(|&len| len != 0) {
        Some(len) => len,
        None => hint.map_or(DEFAULT_STRONG_LEN.min(digest_len), |len| {
            derive_strong_len(len, block_len, digest_len)
        }),
    };

    SignatureLayout::new(algorithm, block_len, strong_len)
}

fn derive_block_length(file_length: u64) -> u32 {
    if file_length <= u64::from(BLOCK_SIZE).saturating_mul(u64::from(BLOCK_SIZE)) {
        return BLOCK_SIZE;
    }

    let mut c: u64 = 1;
    let mut l = file_length;
    while l >> 2 != 0 {
        c <<= 1;
        l >>= 2;
    }

    if c >= u64::from(MAX_HEURISTIC_BLOCK_LEN) {
        return MAX_HEURISTIC_BLOCK_LEN;
    }

    let mut block_length = 0u64;
    let mut current = c;
    while current >= 8 {
        block_length |= current;
        let candidate = u128::from(block_length);
        if u128::from(file_length) < candidate.saturating_mul(candidate) {
            block_length &= !current;
        }
        current >>= 1;
    }

    block_length.max(u64::from(BLOCK_SIZE)) as u32
}

fn derive_strong_len(file_length: u64, block_length: u32, digest_len: u32) -> u32 {
    let mut bias = BLOCKSUM_BIAS;
    let mut l = file_length;
    while l >> 1 != 0 {
        l >>= 1;
        bias += 2;
    }

    let mut current = block_length;
    while current >> 1 != 0 && bias > 0 {
        current >>= 1;
        bias -= 1;
    }

    let strong_len = ((bias + 1 - 32 + 7) / 8).max(0) as u32;
    strong_len.clamp(MIN_STRONG_LEN.min(digest_len), digest_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_hint() {
        let layout = resolve_layout(SignatureOptions::new()).expect("layout");
        assert_eq!(layout.block_len(), DEFAULT_BLOCK_LEN);
        assert_eq!(layout.strong_len(), DEFAULT_STRONG_LEN);
        assert_eq!(layout.algorithm(), SignatureAlgorithm::Md4);
    }

    #[test]
    fn small_hint_uses_minimum_block_size() {
        let layout =
            resolve_layout(SignatureOptions::new().with_basis_len_hint(32)).expect("layout");
        assert_eq!(layout.block_len(), 700);
        assert_eq!(layout.strong_len(), MIN_STRONG_LEN);
    }

    #[test]
    fn block_length_scales_with_hint() {
        let layout = resolve_layout(SignatureOptions::new().with_basis_len_hint(10 * 1024 * 1024))
            .expect("layout");
        assert_eq!(layout.block_len(), 3_232);
        assert_eq!(layout.block_count(10 * 1024 * 1024), 3_245);
    }

    #[test]
    fn huge_hint_clamps_block_length() {
        let layout =
            resolve_layout(SignatureOptions::new().with_basis_len_hint(1u64 << 34)).expect("layout");
        assert_eq!(layout.block_len(), 131_072);
    }

    #[test]
    fn strong_length_grows_with_block_count() {
        let small = resolve_layout(SignatureOptions::new().with_basis_len_hint(1 << 20))
            .expect("layout");
        let huge = resolve_layout(SignatureOptions::new().with_basis_len_hint(1u64 << 62))
            .expect("layout");
        assert!(huge.strong_len() > small.strong_len());
        assert!(huge.strong_len() <= 16);
    }

    #[test]
    fn forced_values_are_honoured() {
        let layout = resolve_layout(
            SignatureOptions::new()
                .with_block_len(4096)
                .with_strong_len(16)
                .with_basis_len_hint(50_000),
        )
        .expect("layout");
        assert_eq!(layout.block_len(), 4096);
        assert_eq!(layout.strong_len(), 16);
        assert_eq!(layout.block_count(50_000), 13);
    }

    #[test]
    fn zero_lengths_are_derived() {
        let derived = resolve_layout(SignatureOptions::new()).expect("layout");
        assert_eq!(
            resolve_layout(SignatureOptions::new().with_block_len(0)),
            Ok(derived)
        );
        assert_eq!(
            resolve_layout(SignatureOptions::new().with_strong_len(0)),
            Ok(derived)
        );

        let hinted = SignatureOptions::new().with_basis_len_hint(1 << 24);
        let layout = resolve_layout(hinted.with_block_len(0).with_strong_len(0)).expect("layout");
        assert_eq!(layout, resolve_layout(hinted).expect("layout"));
        assert_eq!(layout.block_len(), 4096);
    }

    #[test]
    fn layout_rejects_zero_lengths() {
        assert_eq!(
            SignatureLayout::new(SignatureAlgorithm::Md4, 0, 8),
            Err(LayoutError::ZeroBlockLength)
        );
        assert_eq!(
            SignatureLayout::new(SignatureAlgorithm::Md4, 2048, 0),
            Err(LayoutError::ZeroStrongLength)
        );
    }

    #[test]
    fn oversized_values_are_rejected() {
        assert!(matches!(
            resolve_layout(SignatureOptions::new().with_block_len(MAX_BLOCK_LEN + 1)),
            Err(LayoutError::BlockLengthTooLarge { .. })
        ));
        assert_eq!(
            resolve_layout(SignatureOptions::new().with_strong_len(17)),
            Err(LayoutError::StrongLengthTooLong {
                requested: 17,
                algorithm: SignatureAlgorithm::Md4,
            })
        );
        assert!(
            resolve_layout(
                SignatureOptions::new()
                    .with_algorithm(SignatureAlgorithm::Sha1)
                    .with_strong_len(20)
            )
            .is_ok()
        );
    }

    #[test]
    fn oversized_hint_is_rejected() {
        assert!(matches!(
            resolve_layout(SignatureOptions::new().with_basis_len_hint(u64::MAX)),
            Err(LayoutError::BasisTooLarge { .. })
        ));
    }

    #[test]
    fn layout_error_becomes_invalid_parameters() {
        let error: streaming::JobError = LayoutError::ZeroBlockLength.into();
        assert!(matches!(error, streaming::JobError::InvalidParameters(_)));
    }

    #[test]
    fn empty_basis_has_no_blocks() {
        let layout = resolve_layout(SignatureOptions::new()).expect("layout");
        assert_eq!(layout.block_count(0), 0);
        assert_eq!(layout.block_count(1), 1);
        assert_eq!(layout.block_count(2048), 1);
        assert_eq!(layout.block_count(2049), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn options_load_from_json() {
        let options: SignatureOptions =
            serde_json::from_str(r#"{"block_len": 700, "algorithm": "xxh3_128"}"#)
                .expect("parse options");
        assert_eq!(options.block_len(), Some(700));
        assert_eq!(options.strong_len(), None);
        assert_eq!(options.algorithm(), SignatureAlgorithm::Xxh3_128);
    }
}
