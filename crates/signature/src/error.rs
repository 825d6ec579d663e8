//! crates/signature/src/error.rs

use std::io;

use streaming::{DriveError, JobError};
use thiserror::Error;

use crate::layout::LayoutError;

/// Errors returned by the one-shot signature helpers.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The requested parameters are unusable.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// The signature job failed.
    #[error(transparent)]
    Job(#[from] JobError),
    /// Underlying I/O failure raised while reading input.
    #[error("failed to read input while processing signature: {0}")]
    Io(#[from] io::Error),
    /// A block record does not fit the signature it is being added to.
    #[error("block {index} at position {position} does not match the signature layout")]
    InconsistentBlock {
        /// Index carried by the block.
        index: u64,
        /// Position the block would occupy.
        position: u64,
    },
}

impl From<DriveError> for SignatureError {
    fn from(error: DriveError) -> Self {
        match error {
            DriveError::Job(error) => Self::Job(error),
            DriveError::Io(error) => Self::Io(error),
        }
    }
}
