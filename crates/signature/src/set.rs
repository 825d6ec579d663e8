//! crates/signature/src/set.rs
//!
//! Ordered collection of block records for one basis.

use std::io::{self, Write};

use crate::block::SignatureBlock;
use crate::error::SignatureError;
use crate::layout::SignatureLayout;
use crate::wire;

/// Signature of a basis: its [`SignatureLayout`] and one record per block in block order.
///
/// A set is immutable once the job that built or loaded it has finished.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignatureSet {
    layout: SignatureLayout,
    blocks: Vec<SignatureBlock>,
}

impl SignatureSet {
    /// Creates a set with no blocks.
    #[must_use]
    pub const fn new(layout: SignatureLayout) -> Self {
        Self {
            layout,
            blocks: Vec::new(),
        }
    }

    /// Creates a set from existing block records.
    ///
    /// Blocks must be numbered `0..n` in order and carry exactly
    /// `strong_len` digest bytes.
    pub fn from_blocks(
        layout: SignatureLayout,
        blocks: Vec<SignatureBlock>,
    ) -> Result<Self, SignatureError> {
        let strong_len = layout.strong_len() as usize;
        for (position, block) in blocks.iter().enumerate() {
            if block.index() != position as u64 || block.strong().len() != strong_len {
                return Err(SignatureError::InconsistentBlock {
                    index: block.index(),
                    position: position as u64,
                });
            }
        }
        Ok(Self { layout, blocks })
    }

    pub(crate) fn push(&mut self, weak: u32, strong: Vec<u8>) {
        let index = self.blocks.len() as u64;
        self.blocks.push(SignatureBlock::new(index, weak, strong));
    }

    /// Returns the layout the set was built with.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> SignatureLayout {
        self.layout
    }

    /// Returns the block length in bytes.
    #[inline]
    #[must_use]
    pub const fn block_len(&self) -> u32 {
        self.layout.block_len()
    }

    /// Returns the truncated strong digest length in bytes.
    #[inline]
    #[must_use]
    pub const fn strong_len(&self) -> u32 {
        self.layout.strong_len()
    }

    /// Returns the block records in block order.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[SignatureBlock] {
        &self.blocks
    }

    /// Returns the number of block records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` when the basis was empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Byte offset of block `index` in the basis.
    #[inline]
    #[must_use]
    pub const fn block_offset(&self, index: u64) -> u64 {
        index * self.layout.block_len() as u64
    }

    /// Length of the serialized form in bytes.
    #[must_use]
    pub fn serialized_len(&self) -> usize {
        wire::HEADER_LEN + self.blocks.len() * wire::record_len(&self.layout)
    }

    /// Serializes the set.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        out.extend_from_slice(&wire::encode_header(&self.layout));
        for block in &self.blocks {
            wire::encode_record(block.weak(), block.strong(), &mut out);
        }
        out
    }

    /// Writes the serialized set to `writer`.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&wire::encode_header(&self.layout))?;
        let mut record = Vec::with_capacity(wire::record_len(&self.layout));
        for block in &self.blocks {
            record.clear();
            wire::encode_record(block.weak(), block.strong(), &mut record);
            writer.write_all(&record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::SignatureAlgorithm;

    fn layout() -> SignatureLayout {
        SignatureLayout::new(SignatureAlgorithm::Md4, 4, 2).expect("layout")
    }

    #[test]
    fn push_numbers_blocks_in_order() {
        let mut set = SignatureSet::new(layout());
        set.push(1, vec![0xaa, 0xbb]);
        set.push(2, vec![0xcc, 0xdd]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.blocks()[1].index(), 1);
        assert_eq!(set.block_offset(1), 4);
    }

    #[test]
    fn from_blocks_rejects_gaps_and_bad_digests() {
        let gap = vec![SignatureBlock::new(1, 0, vec![0, 0])];
        assert!(matches!(
            SignatureSet::from_blocks(layout(), gap),
            Err(SignatureError::InconsistentBlock { index: 1, position: 0 })
        ));

        let short = vec![SignatureBlock::new(0, 0, vec![0])];
        assert!(SignatureSet::from_blocks(layout(), short).is_err());

        let ok = vec![SignatureBlock::new(0, 9, vec![1, 2])];
        assert_eq!(SignatureSet::from_blocks(layout(), ok).expect("valid").len(), 1);
    }

    #[test]
    fn to_bytes_matches_write_to() {
        let mut set = SignatureSet::new(layout());
        set.push(0x0102_0304, vec![5, 6]);
        let bytes = set.to_bytes();
        assert_eq!(bytes.len(), set.serialized_len());
        assert_eq!(&bytes[12..], &[1, 2, 3, 4, 5, 6]);

        let mut written = Vec::new();
        set.write_to(&mut written).expect("write");
        assert_eq!(written, bytes);
    }
}
