#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `deltasync` computes compact binary deltas between a basis and a target
//! and rebuilds the target from the basis plus the delta. It follows the
//! rsync algorithm: the basis is described by per-block weak and strong
//! checksums, the target is scanned with a rolling window looking for those
//! blocks, and the delta is a list of basis copies and literal bytes.
//!
//! # Operations
//!
//! A caller runs four operations in order:
//!
//! 1. [`build_signature`] over the basis,
//! 2. [`build_match_table`] from the signature,
//! 3. [`encode_delta`] over the target,
//! 4. [`apply_patch`] with a random-access [`BasisSource`].
//!
//! Each one is also available as a resumable job ([`begin_signature`],
//! [`begin_delta`], [`begin_patch`], plus [`begin_load_signature`] for
//! serialized signatures) that the caller feeds in bounded chunks with
//! [`Job::iterate`] or [`iter_job`]. Jobs never block on input and report
//! [`JobStatus::Blocked`] whenever the caller has to act.
//!
//! # Crates
//!
//! - [`checksums`]: rolling checksum and strong digests.
//! - [`signature`]: block layout, signature builder and loader jobs.
//! - [`matching`]: match table, delta encoder and patch applier jobs.
//! - [`streaming`]: the job engine shared by every operation.
//! - [`logging`]: verbosity flags and diagnostics.
//!
//! # Examples
//!
//! ```
//! use deltasync::{SignatureOptions, apply_patch, build_match_table, build_signature, encode_delta};
//!
//! let basis = vec![b'A'; 1000];
//! let mut target = basis.clone();
//! target[500..510].fill(b'B');
//!
//! let options = SignatureOptions::new().with_block_len(10);
//! let signature = build_signature(&mut basis.as_slice(), options)?;
//! let table = build_match_table(signature);
//!
//! let mut delta = Vec::new();
//! encode_delta(&table, &mut target.as_slice(), &mut delta)?;
//!
//! let mut rebuilt = Vec::new();
//! apply_patch(&mut delta.as_slice(), basis.as_slice(), &mut rebuilt)?;
//! assert_eq!(rebuilt, target);
//! # Ok::<(), deltasync::Error>(())
//! ```

use std::io::{Read, Write};
use std::sync::Arc;

use thiserror::Error;

pub use checksums;
pub use logging;
pub use matching;
pub use signature;
pub use streaming;

pub use matching::{
    ApplyStats, BasisSource, DeltaEncoder, DeltaError, DeltaScript, DeltaToken, EncodeStats,
    MatchTable, PatchApplier, SeekSource,
};
pub use signature::{
    LoadSignature, SignatureAlgorithm, SignatureBuilder, SignatureError, SignatureLayout,
    SignatureOptions, SignatureSet,
};
pub use streaming::{
    BlockedOn, DriverConfig, IO_BUFFER_SIZE, Iteration, Job, JobError, JobStatus, Step,
};

/// Errors returned by the blocking operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Building or loading a signature failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// Encoding or applying a delta failed.
    #[error(transparent)]
    Delta(#[from] DeltaError),
}

impl Error {
    /// Returns the job error behind this failure, if any.
    #[must_use]
    pub const fn job_error(&self) -> Option<&JobError> {
        match self {
            Self::Signature(SignatureError::Job(error)) | Self::Delta(DeltaError::Job(error)) => {
                Some(error)
            }
            Self::Signature(_) | Self::Delta(_) => None,
        }
    }
}

/// Builds the signature of everything `basis` yields.
///
/// # Errors
///
/// Fails when `options` are invalid or reading `basis` fails.
pub fn build_signature<R: Read + ?Sized>(
    basis: &mut R,
    options: SignatureOptions,
) -> Result<SignatureSet, Error> {
    Ok(signature::generate_signature(basis, options)?)
}

/// Reads a serialized signature.
///
/// # Errors
///
/// Fails when the signature is malformed or reading fails.
pub fn load_signature<R: Read + ?Sized>(reader: &mut R) -> Result<SignatureSet, Error> {
    Ok(signature::load_signature(reader)?)
}

/// Indexes `signature` for delta encoding.
///
/// The table is immutable and can be shared by any number of encoders.
#[must_use]
pub fn build_match_table(signature: SignatureSet) -> Arc<MatchTable> {
    Arc::new(MatchTable::build(signature))
}

/// Encodes `target` against `table`, writing the delta to `writer`.
///
/// # Errors
///
/// Fails when reading the target or writing the delta fails.
pub fn encode_delta<R, W>(
    table: &Arc<MatchTable>,
    target: &mut R,
    writer: &mut W,
) -> Result<EncodeStats, Error>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    Ok(matching::generate_delta(Arc::clone(table), target, writer)?)
}

/// Applies the delta read from `delta` to `basis`, writing the target to
/// `writer`.
///
/// # Errors
///
/// Fails with [`JobError::MalformedDelta`] for corrupt deltas,
/// [`JobError::TruncatedBasis`] when `basis` is too short, and with I/O
/// errors from the reader or writer.
pub fn apply_patch<R, B, W>(delta: &mut R, basis: B, writer: &mut W) -> Result<ApplyStats, Error>
where
    R: Read + ?Sized,
    B: BasisSource,
    W: Write + ?Sized,
{
    Ok(matching::apply_delta(delta, basis, writer)?)
}

/// Starts a signature job.
///
/// # Errors
///
/// Fails with [`JobError::InvalidParameters`] for unusable options.
pub fn begin_signature(options: SignatureOptions) -> Result<Job<SignatureBuilder>, JobError> {
    SignatureBuilder::begin(options)
}

/// Starts a job that parses a serialized signature.
#[must_use]
pub const fn begin_load_signature() -> Job<LoadSignature> {
    LoadSignature::begin()
}

/// Starts a delta encoding job against `table`.
#[must_use]
pub fn begin_delta(table: &Arc<MatchTable>) -> Job<DeltaEncoder> {
    DeltaEncoder::begin(Arc::clone(table))
}

/// Starts a patch job reading copies from `basis`.
pub const fn begin_patch<B: BasisSource>(basis: B) -> Job<PatchApplier<B>> {
    PatchApplier::begin(basis)
}

/// Runs one iteration of `job` over `input`, appending output to `output`.
///
/// An empty `input` marks the end of the stream. The output vector grows
/// as needed, so the call returns once the job wants more input, has
/// finished, or is waiting on its basis.
///
/// # Errors
///
/// Returns the job's error; the job is aborted afterwards.
pub fn iter_job<S: streaming::JobStep>(
    job: &mut Job<S>,
    input: &[u8],
    output: &mut Vec<u8>,
) -> Result<Iteration, JobError> {
    streaming::iterate_growing(job, input, output)
}

/// Computes the delta that turns `basis` into `target`.
///
/// # Errors
///
/// Fails when `options` are invalid.
pub fn delta_between(
    basis: &[u8],
    target: &[u8],
    options: SignatureOptions,
) -> Result<Vec<u8>, Error> {
    let signature = signature::signature_of(basis, options).map_err(SignatureError::from)?;
    let table = build_match_table(signature);
    let mut delta = Vec::new();
    encode_delta(&table, &mut &target[..], &mut delta)?;
    Ok(delta)
}

/// Rebuilds a target from an in-memory `basis` and `delta`.
///
/// # Errors
///
/// Fails when the delta is malformed or refers past the end of `basis`.
pub fn patch_bytes(basis: &[u8], delta: &[u8]) -> Result<Vec<u8>, Error> {
    let mut target = Vec::new();
    apply_patch(&mut &delta[..], basis, &mut target)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_between_round_trips() {
        let basis = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let mut target = basis.clone();
        target.splice(100..110, b"0123456789abcdef".iter().copied());

        let options = SignatureOptions::new().with_block_len(16);
        let delta = delta_between(&basis, &target, options).expect("delta");
        assert!(delta.len() < target.len());
        assert_eq!(patch_bytes(&basis, &delta).expect("patch"), target);
    }

    #[test]
    fn job_error_is_exposed() {
        let error = patch_bytes(b"", b"nope").expect_err("bad delta");
        assert!(matches!(error.job_error(), Some(JobError::MalformedDelta(_))));
    }

    #[test]
    fn invalid_options_surface_as_signature_errors() {
        let error = delta_between(b"a", b"b", SignatureOptions::new().with_strong_len(17))
            .expect_err("strong length beyond digest");
        assert!(matches!(error, Error::Signature(SignatureError::Layout(_))));
    }

    #[test]
    fn iter_job_drives_signature() {
        let mut job = begin_signature(SignatureOptions::new().with_block_len(4)).expect("job");
        let mut output = Vec::new();
        let first = iter_job(&mut job, b"abcdef", &mut output).expect("iterate");
        assert_eq!(first.status, JobStatus::Blocked(BlockedOn::Input));
        let last = iter_job(&mut job, &[], &mut output).expect("finish");
        assert!(last.is_done());

        let loaded = load_signature(&mut output.as_slice()).expect("load");
        assert_eq!(&loaded, job.inner().signature());
    }
}
