//! crates/match/src/error.rs

use std::io;

use streaming::{DriveError, JobError};
use thiserror::Error;

/// Errors returned by the blocking delta helpers.
#[derive(Debug, Error)]
pub enum DeltaError {
    /// The encoder or applier job failed.
    #[error(transparent)]
    Job(#[from] JobError),
    /// Reading input or writing output failed.
    #[error("delta stream I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl From<DriveError> for DeltaError {
    fn from(error: DriveError) -> Self {
        match error {
            DriveError::Job(error) => Self::Job(error),
            DriveError::Io(error) => Self::Io(error),
        }
    }
}

impl DeltaError {
    /// Returns the job error, if the failure came from the job itself.
    #[must_use]
    pub const fn job_error(&self) -> Option<&JobError> {
        match self {
            Self::Job(error) => Some(error),
            Self::Io(_) => None,
        }
    }
}
