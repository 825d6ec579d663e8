//! crates/signature/src/block.rs
//!
//! Individual signature block representation.

/// Describes a single basis block within a signature.
///
/// The block's byte offset is `index * block_len`. The length of the final
/// block is not recorded; a loaded signature cannot know it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SignatureBlock {
    index: u64,
    weak: u32,
    strong: Vec<u8>,
}

impl SignatureBlock {
    /// Creates a block descriptor from its components.
    #[must_use]
    pub const fn new(index: u64, weak: u32, strong: Vec<u8>) -> Self {
        Self {
            index,
            weak,
            strong,
        }
    }

    /// Returns the zero-based index of the block within the signature.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Returns the packed rolling checksum of the block.
    #[inline]
    #[must_use]
    pub const fn weak(&self) -> u32 {
        self.weak
    }

    /// Returns the truncated strong checksum bytes for the block.
    #[inline]
    #[must_use]
    pub fn strong(&self) -> &[u8] {
        &self.strong
    }
}
