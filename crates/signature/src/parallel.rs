//! crates/signature/src/parallel.rs
//!
//! Parallel signature generation using rayon.
//!
//! Two shapes are supported: many independent bases, each hashed on its own
//! worker, and one large in-memory basis whose blocks are hashed
//! concurrently. Both produce exactly the same [`SignatureSet`] as the
//! sequential builder.

use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

use checksums::RollingDigest;

use crate::block::SignatureBlock;
use crate::error::SignatureError;
use crate::generation::signature_of;
use crate::layout::{LayoutError, SignatureOptions, resolve_layout};
use crate::set::SignatureSet;

/// Minimum basis size (in bytes) where hashing blocks in parallel pays off.
///
/// Below this the rayon scheduling overhead outweighs the digest work for
/// typical block lengths.
pub const PARALLEL_THRESHOLD_BYTES: u64 = 256 * 1024;

/// Builds the signature of every buffer in `bases` on the rayon pool.
///
/// The results are returned in input order. Each basis gets its own layout,
/// so a missing size hint in `options` is filled in per basis from its
/// length.
///
/// # Errors
///
/// Returns the first [`LayoutError`] encountered.
#[cfg_attr(
    feature = "tracing",
    instrument(skip(bases), fields(count = bases.len()), name = "generate_signatures_parallel")
)]
pub fn generate_signatures_parallel<B>(
    bases: &[B],
    options: SignatureOptions,
) -> Result<Vec<SignatureSet>, LayoutError>
where
    B: AsRef<[u8]> + Sync,
{
    bases
        .par_iter()
        .map(|basis| {
            let basis = basis.as_ref();
            let options = match options.basis_len_hint() {
                Some(_) => options,
                None => options.with_basis_len_hint(basis.len() as u64),
            };
            signature_of(basis, options)
        })
        .collect()
}

/// Builds the signature of one in-memory basis, hashing blocks concurrently.
///
/// # Errors
///
/// Returns the [`LayoutError`] for unusable options.
pub fn signature_of_parallel(
    data: &[u8],
    options: SignatureOptions,
) -> Result<SignatureSet, SignatureError> {
    let layout = resolve_layout(options)?;
    let strong_len = layout.strong_len() as usize;
    let algorithm = layout.algorithm();

    let blocks: Vec<SignatureBlock> = data
        .par_chunks(layout.block_len() as usize)
        .enumerate()
        .map(|(index, chunk)| {
            let weak = RollingDigest::from_bytes(chunk).value();
            SignatureBlock::new(
                index as u64,
                weak,
                algorithm.compute_truncated(chunk, strong_len),
            )
        })
        .collect();

    SignatureSet::from_blocks(layout, blocks)
}

/// Builds the signature of `data`, choosing parallel hashing for large inputs.
///
/// # Errors
///
/// Returns the [`LayoutError`] for unusable options.
pub fn signature_of_auto(
    data: &[u8],
    options: SignatureOptions,
) -> Result<SignatureSet, SignatureError> {
    if data.len() as u64 >= PARALLEL_THRESHOLD_BYTES {
        signature_of_parallel(data, options)
    } else {
        Ok(signature_of(data, options)?)
    }
}
