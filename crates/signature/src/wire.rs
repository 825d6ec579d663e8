//! crates/signature/src/wire.rs
//!
//! Serialized signature format.
//!
//! All integers are big-endian.
//!
//! ```text
//! header  := magic:u32 block_len:u32 strong_len:u32
//! record  := weak:u32 strong:[u8; strong_len]
//! stream  := header record*
//! ```
//!
//! The magic number names the strong checksum algorithm. Records appear in
//! block order, so the block index is implicit.

use streaming::JobError;

use crate::algorithm::SignatureAlgorithm;
use crate::layout::{LayoutError, SignatureLayout};

/// Length of the serialized header.
pub const HEADER_LEN: usize = 12;

/// Serializes the header of a signature with `layout`.
#[must_use]
pub fn encode_header(layout: &SignatureLayout) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(&layout.magic().to_be_bytes());
    header[4..8].copy_from_slice(&layout.block_len().to_be_bytes());
    header[8..].copy_from_slice(&layout.strong_len().to_be_bytes());
    header
}

/// Parses a serialized header.
///
/// Fails with [`JobError::MalformedSignature`] on an unknown magic number or
/// lengths that do not form a valid layout.
pub fn decode_header(header: &[u8; HEADER_LEN]) -> Result<SignatureLayout, JobError> {
    let magic = read_u32(&header[..4]);
    let block_len = read_u32(&header[4..8]);
    let strong_len = read_u32(&header[8..]);

    let algorithm = SignatureAlgorithm::from_magic(magic).ok_or_else(|| {
        JobError::malformed_signature(format!("unknown signature magic {magic:#010x}"))
    })?;

    SignatureLayout::new(algorithm, block_len, strong_len)
        .map_err(|error: LayoutError| JobError::malformed_signature(error.to_string()))
}

/// Length of one serialized block record.
#[must_use]
pub const fn record_len(layout: &SignatureLayout) -> usize {
    4 + layout.strong_len() as usize
}

/// Appends one block record to `out`.
pub fn encode_record(weak: u32, strong: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&weak.to_be_bytes());
    out.extend_from_slice(strong);
}

/// Splits a serialized record into its weak checksum and strong digest.
#[must_use]
pub fn decode_record(record: &[u8]) -> (u32, &[u8]) {
    (read_u32(&record[..4]), &record[4..])
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    u32::from_be_bytes(raw)
}
