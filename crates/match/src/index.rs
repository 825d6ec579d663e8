//! crates/match/src/index.rs
//!
//! Weak-checksum index over a finalized signature.

use rustc_hash::FxHashMap;

use logging::debug_log;
use signature::{SignatureBlock, SignatureLayout, SignatureSet};

/// Lookup table from weak checksums to the basis blocks that carry them.
///
/// The table is built once from a finished [`SignatureSet`] and never
/// mutated afterwards, so it can be shared between encoder jobs running on
/// different threads behind an [`Arc`](std::sync::Arc).
#[derive(Clone, Debug)]
pub struct MatchTable {
    signature: SignatureSet,
    buckets: FxHashMap<u32, Vec<usize>>,
}

impl MatchTable {
    /// Indexes every record of `signature`.
    ///
    /// Each bucket lists its blocks in ascending order.
    #[must_use]
    pub fn build(signature: SignatureSet) -> Self {
        let mut buckets: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
        buckets.reserve(signature.len());
        for (index, block) in signature.blocks().iter().enumerate() {
            buckets.entry(block.weak()).or_default().push(index);
        }

        debug_log!(
            Hash,
            1,
            "match table: {} blocks in {} buckets",
            signature.len(),
            buckets.len()
        );

        Self { signature, buckets }
    }

    /// Returns the indexed signature.
    #[must_use]
    pub const fn signature(&self) -> &SignatureSet {
        &self.signature
    }

    /// Returns the signature layout.
    #[must_use]
    pub const fn layout(&self) -> SignatureLayout {
        self.signature.layout()
    }

    /// Returns the block length in bytes.
    #[must_use]
    pub const fn block_len(&self) -> usize {
        self.signature.block_len() as usize
    }

    /// Returns the number of indexed blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.signature.len()
    }

    /// Returns `true` when the basis was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signature.is_empty()
    }

    /// Returns the number of distinct weak checksums.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the block record at `index`.
    #[must_use]
    pub fn block(&self, index: usize) -> Option<&SignatureBlock> {
        self.signature.blocks().get(index)
    }

    /// Byte offset of block `index` in the basis.
    #[must_use]
    pub const fn block_offset(&self, index: usize) -> u64 {
        self.signature.block_offset(index as u64)
    }

    /// Blocks whose weak checksum equals `weak`, lowest offset first.
    #[must_use]
    pub fn candidates(&self, weak: u32) -> &[usize] {
        self.buckets.get(&weak).map(Vec::as_slice).unwrap_or_default()
    }

    /// Truncated strong digest of `data` using the signature's algorithm.
    #[must_use]
    pub fn strong_digest(&self, data: &[u8]) -> Vec<u8> {
        let layout = self.layout();
        layout
            .algorithm()
            .compute_truncated(data, layout.strong_len() as usize)
    }

    /// Returns `true` when block `index` has checksums `weak` and the strong
    /// digest of `data`.
    #[must_use]
    pub fn block_matches(&self, index: usize, weak: u32, data: &[u8]) -> bool {
        self.block(index).is_some_and(|block| {
            block.weak() == weak && block.strong() == self.strong_digest(data).as_slice()
        })
    }

    /// Finds a basis block whose content reproduces `window`.
    ///
    /// `weak` must be the rolling checksum of `window`. Candidates named in
    /// `hints` are tried first, in order; otherwise the lowest-offset block
    /// whose strong digest matches wins. The strong digest of `window` is
    /// computed at most once, and only if some block shares its weak
    /// checksum.
    #[must_use]
    pub fn find(&self, weak: u32, window: &[u8], hints: &[usize]) -> Option<usize> {
        let candidates = self.candidates(weak);
        if candidates.is_empty() {
            return None;
        }

        let digest = self.strong_digest(window);
        let verifies = |index: usize| self.signature.blocks()[index].strong() == digest.as_slice();

        let hinted = hints
            .iter()
            .copied()
            .find(|hint| candidates.binary_search(hint).is_ok() && verifies(*hint));
        if hinted.is_some() {
            return hinted;
        }

        let found = candidates.iter().copied().find(|&index| verifies(index));
        if found.is_none() {
            debug_log!(
                Hash,
                3,
                "false alarm: weak {weak:#010x} matched {} block(s)",
                candidates.len()
            );
        }
        found
    }
}

impl From<SignatureSet> for MatchTable {
    fn from(signature: SignatureSet) -> Self {
        Self::build(signature)
    }
}
