//! crates/signature/src/generation.rs
//!
//! Signature generation over a basis stream.
//!
//! [`SignatureBuilder`] is a [`JobStep`]: it accepts basis bytes in chunks of
//! any size, cuts them into `block_len` blocks and emits the serialized
//! signature as it goes. The in-memory [`SignatureSet`] is kept alongside so
//! callers that only need the set can discard the output.

use std::io::{self, Read};

use checksums::RollingDigest;
use logging::debug_log;
use streaming::{BlockedOn, Buffers, DriverConfig, Job, JobError, JobStatus, JobStep, PendingOutput};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::SignatureError;
use crate::layout::{LayoutError, SignatureLayout, SignatureOptions, resolve_layout};
use crate::set::SignatureSet;
use crate::wire;

/// Streaming signature builder.
///
/// Only the trailing partial block is buffered; full blocks available in the
/// input are hashed in place.
#[derive(Debug)]
pub struct SignatureBuilder {
    set: SignatureSet,
    block: Vec<u8>,
    record: Vec<u8>,
    pending: PendingOutput,
    basis_len: u64,
    finished: bool,
}

impl SignatureBuilder {
    /// Creates a builder with a layout resolved from `options`.
    ///
    /// # Errors
    ///
    /// Returns the [`LayoutError`] produced by [`resolve_layout`].
    pub fn new(options: SignatureOptions) -> Result<Self, LayoutError> {
        resolve_layout(options).map(Self::with_layout)
    }

    /// Creates a builder for an already validated layout.
    #[must_use]
    pub fn with_layout(layout: SignatureLayout) -> Self {
        let mut pending = PendingOutput::new();
        pending.push(&wire::encode_header(&layout));
        debug_log!(
            Sig,
            1,
            "signature: {} block_len={} strong_len={}",
            layout.algorithm(),
            layout.block_len(),
            layout.strong_len()
        );

        Self {
            set: SignatureSet::new(layout),
            block: Vec::with_capacity(layout.block_len().min(1 << 16) as usize),
            record: Vec::with_capacity(wire::record_len(&layout)),
            pending,
            basis_len: 0,
            finished: false,
        }
    }

    /// Starts a signature job.
    ///
    /// # Errors
    ///
    /// Fails with [`JobError::InvalidParameters`] when `options` cannot
    /// produce a valid layout; no job is created in that case.
    pub fn begin(options: SignatureOptions) -> Result<Job<Self>, JobError> {
        Ok(Job::new(Self::new(options)?))
    }

    /// Returns the layout in use.
    #[must_use]
    pub const fn layout(&self) -> SignatureLayout {
        self.set.layout()
    }

    /// Returns the records produced so far.
    #[must_use]
    pub const fn signature(&self) -> &SignatureSet {
        &self.set
    }

    /// Returns `true` once the final block has been emitted.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consumes the builder, returning the signature.
    ///
    /// The set is only complete when the job reported
    /// [`JobStatus::Done`].
    #[must_use]
    pub fn into_signature(self) -> SignatureSet {
        self.set
    }

    fn emit(&mut self, data: &[u8]) {
        let layout = self.set.layout();
        let weak = RollingDigest::from_bytes(data).value();
        let strong = layout
            .algorithm()
            .compute_truncated(data, layout.strong_len() as usize);

        self.record.clear();
        wire::encode_record(weak, &strong, &mut self.record);
        self.pending.push(&self.record);
        self.basis_len += data.len() as u64;

        debug_log!(
            Sig,
            3,
            "block {} len={} weak={weak:#010x}",
            self.set.len(),
            data.len()
        );
        self.set.push(weak, strong);
    }

    fn emit_buffered(&mut self) {
        let block = std::mem::take(&mut self.block);
        self.emit(&block);
        self.block = block;
        self.block.clear();
    }
}

impl JobStep for SignatureBuilder {
    const NAME: &'static str = "signature";

    fn step(&mut self, buffers: &mut Buffers<'_>) -> Result<JobStatus, JobError> {
        let block_len = self.set.block_len() as usize;

        loop {
            if !self.pending.flush(buffers) {
                return Ok(JobStatus::Blocked(BlockedOn::Output));
            }
            if self.finished {
                return Ok(JobStatus::Done);
            }

            if self.block.is_empty() && buffers.input().len() >= block_len {
                let data = buffers.take_input(block_len);
                self.emit(data);
                continue;
            }

            let data = buffers.take_input(block_len - self.block.len());
            self.block.extend_from_slice(data);
            if self.block.len() == block_len {
                self.emit_buffered();
                continue;
            }

            if !buffers.is_eof() {
                return Ok(JobStatus::Blocked(BlockedOn::Input));
            }
            if !self.block.is_empty() {
                self.emit_buffered();
            }
            self.finished = true;
            debug_log!(
                Sig,
                1,
                "signature done: {} blocks over {} bytes",
                self.set.len(),
                self.basis_len
            );
        }
    }
}

/// Builds the signature of everything `reader` yields.
///
/// # Errors
///
/// Returns [`SignatureError::Layout`] for unusable options and
/// [`SignatureError::Io`] when reading fails.
#[cfg_attr(
    feature = "tracing",
    instrument(skip(reader), fields(algorithm = %options.algorithm()), name = "generate_signature")
)]
pub fn generate_signature<R: Read + ?Sized>(
    reader: &mut R,
    options: SignatureOptions,
) -> Result<SignatureSet, SignatureError> {
    let mut job = Job::new(SignatureBuilder::new(options)?);
    streaming::run_to_end(&mut job, reader, &mut io::sink(), DriverConfig::default())?;
    Ok(job.into_inner().into_signature())
}

/// Builds the signature of an in-memory basis.
///
/// # Errors
///
/// Returns the [`LayoutError`] for unusable options.
pub fn signature_of(data: &[u8], options: SignatureOptions) -> Result<SignatureSet, LayoutError> {
    let layout = resolve_layout(options)?;
    let strong_len = layout.strong_len() as usize;
    let mut set = SignatureSet::new(layout);
    for block in data.chunks(layout.block_len() as usize) {
        let weak = RollingDigest::from_bytes(block).value();
        set.push(weak, layout.algorithm().compute_truncated(block, strong_len));
    }
    Ok(set)
}
