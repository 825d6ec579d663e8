//! crates/signature/src/load.rs
//!
//! Streaming parser for serialized signatures.

use std::io::Read;

use logging::debug_log;
use streaming::{BlockedOn, Buffers, DriverConfig, Job, JobError, JobStatus, JobStep};

use crate::error::SignatureError;
use crate::set::SignatureSet;
use crate::wire::{self, HEADER_LEN};

#[derive(Debug)]
enum LoadState {
    Header { buf: [u8; HEADER_LEN], filled: usize },
    Records { set: SignatureSet, record: Vec<u8> },
    Done(Option<SignatureSet>),
}

/// Job step that rebuilds a [`SignatureSet`] from its serialized form.
///
/// The loader writes no output. Bytes after the last complete record are
/// only accepted when the stream ends exactly on a record boundary.
#[derive(Debug)]
pub struct LoadSignature {
    state: LoadState,
}

impl LoadSignature {
    /// Creates a loader waiting for the signature header.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LoadState::Header {
                buf: [0u8; HEADER_LEN],
                filled: 0,
            },
        }
    }

    /// Starts a loading job.
    #[must_use]
    pub const fn begin() -> Job<Self> {
        Job::new(Self::new())
    }

    /// Returns the loaded signature once the job has finished.
    #[must_use]
    pub fn into_signature(self) -> Option<SignatureSet> {
        match self.state {
            LoadState::Done(set) => set,
            LoadState::Header { .. } | LoadState::Records { .. } => None,
        }
    }
}

impl Default for LoadSignature {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStep for LoadSignature {
    const NAME: &'static str = "load-signature";

    fn step(&mut self, buffers: &mut Buffers<'_>) -> Result<JobStatus, JobError> {
        loop {
            match &mut self.state {
                LoadState::Header { buf, filled } => {
                    let data = buffers.take_input(HEADER_LEN - *filled);
                    buf[*filled..*filled + data.len()].copy_from_slice(data);
                    *filled += data.len();
                    if *filled < HEADER_LEN {
                        if buffers.is_eof() {
                            return Err(JobError::malformed_signature(format!(
                                "signature header truncated after {filled} bytes"
                            )));
                        }
                        return Ok(JobStatus::Blocked(BlockedOn::Input));
                    }

                    let layout = wire::decode_header(buf)?;
                    debug_log!(
                        Sig,
                        1,
                        "loading {} signature block_len={} strong_len={}",
                        layout.algorithm(),
                        layout.block_len(),
                        layout.strong_len()
                    );
                    self.state = LoadState::Records {
                        set: SignatureSet::new(layout),
                        record: Vec::with_capacity(wire::record_len(&layout)),
                    };
                }
                LoadState::Records { set, record } => {
                    let record_len = wire::record_len(&set.layout());
                    loop {
                        let data = buffers.take_input(record_len - record.len());
                        record.extend_from_slice(data);
                        if record.len() < record_len {
                            break;
                        }
                        let (weak, strong) = wire::decode_record(record);
                        set.push(weak, strong.to_vec());
                        record.clear();
                    }

                    if !buffers.is_eof() {
                        return Ok(JobStatus::Blocked(BlockedOn::Input));
                    }
                    if !record.is_empty() {
                        return Err(JobError::malformed_signature(format!(
                            "signature record {} truncated after {} of {record_len} bytes",
                            set.len(),
                            record.len()
                        )));
                    }

                    debug_log!(Sig, 1, "loaded signature with {} blocks", set.len());
                    let layout = set.layout();
                    let set = std::mem::replace(set, SignatureSet::new(layout));
                    self.state = LoadState::Done(Some(set));
                }
                LoadState::Done(_) => return Ok(JobStatus::Done),
            }
        }
    }
}

/// Reads a serialized signature from `reader`.
///
/// # Errors
///
/// Returns [`SignatureError::Job`] carrying [`JobError::MalformedSignature`]
/// for corrupt input and [`SignatureError::Io`] when reading fails.
pub fn load_signature<R: Read + ?Sized>(reader: &mut R) -> Result<SignatureSet, SignatureError> {
    let mut job = LoadSignature::begin();
    streaming::run_to_end(&mut job, reader, &mut std::io::sink(), DriverConfig::default())?;
    job.into_inner()
        .into_signature()
        .ok_or_else(|| JobError::malformed_signature("signature stream ended early").into())
}
