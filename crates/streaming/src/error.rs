//! crates/streaming/src/error.rs

use std::io;

use thiserror::Error;

/// Fatal job errors.
///
/// Any of these aborts the owning [`Job`](crate::Job). Flow control is not an
/// error and is reported through [`JobStatus::Blocked`](crate::JobStatus::Blocked).
#[derive(Debug, Error)]
pub enum JobError {
    /// The job was configured with unusable block or digest parameters.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// The delta stream is corrupt or truncated.
    #[error("malformed delta: {0}")]
    MalformedDelta(String),
    /// The serialized signature is corrupt or truncated.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
    /// The basis source ran out of data during a copy.
    #[error("basis truncated: {missing} bytes missing at offset {offset}")]
    TruncatedBasis {
        /// Basis offset of the first missing byte.
        offset: u64,
        /// Number of bytes the copy still needed.
        missing: u64,
    },
    /// The basis source failed with an I/O error.
    #[error("basis read failed at offset {offset}: {source}")]
    BasisIo {
        /// Basis offset of the failed read.
        offset: u64,
        /// Error reported by the source.
        #[source]
        source: io::Error,
    },
    /// An earlier iteration failed; the job cannot continue.
    #[error("job was aborted by an earlier error")]
    Aborted,
    /// The job already reported completion.
    #[error("job has already finished")]
    Finished,
}

impl JobError {
    /// Builds [`JobError::InvalidParameters`].
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    /// Builds [`JobError::MalformedDelta`].
    pub fn malformed_delta(message: impl Into<String>) -> Self {
        Self::MalformedDelta(message.into())
    }

    /// Builds [`JobError::MalformedSignature`].
    pub fn malformed_signature(message: impl Into<String>) -> Self {
        Self::MalformedSignature(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_include_context() {
        let err = JobError::TruncatedBasis {
            offset: 500,
            missing: 12,
        };
        assert_eq!(err.to_string(), "basis truncated: 12 bytes missing at offset 500");

        let err = JobError::malformed_delta("unknown command tag 0x7f");
        assert_eq!(err.to_string(), "malformed delta: unknown command tag 0x7f");
    }

    #[test]
    fn basis_io_exposes_source() {
        use std::error::Error as _;

        let err = JobError::BasisIo {
            offset: 0,
            source: io::Error::other("disk on fire"),
        };
        assert!(err.source().is_some());
    }
}
