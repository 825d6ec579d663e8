#![deny(unsafe_code)]

//! Shared test utilities for the deltasync workspace.
//!
//! Deterministic data generators, small-buffer job drivers that exercise the
//! resumable paths of every [`JobStep`], and temporary basis files.

use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use streaming::{BlockedOn, Job, JobError, JobStatus, JobStep};
use tempfile::NamedTempFile;

/// Upper bound on consecutive iterations that make no progress before a
/// driver gives up.
const MAX_IDLE_ITERATIONS: usize = 1024;

/// Returns `len` pseudo-random bytes derived from `seed`.
#[must_use]
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; len];
    StdRng::seed_from_u64(seed).fill_bytes(&mut data);
    data
}

/// Returns `len` bytes of a cheap deterministic pattern.
#[must_use]
pub fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|index| ((index * 31 + index / 251) % 251) as u8).collect()
}

/// Applies `edits` random insertions, deletions and overwrites to `data`.
///
/// Each edit touches at most 64 bytes, so most of the input survives and a
/// delta against the original has plenty of copies.
#[must_use]
pub fn mutate(data: &[u8], edits: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = data.to_vec();

    for _ in 0..edits {
        let at = rng.gen_range(0..=out.len());
        let len = rng.gen_range(1..=64usize);
        match rng.gen_range(0..3u8) {
            0 => {
                let mut insert = vec![0u8; len];
                rng.fill_bytes(&mut insert);
                out.splice(at..at, insert);
            }
            1 => {
                let end = (at + len).min(out.len());
                out.drain(at..end);
            }
            _ => {
                let end = (at + len).min(out.len());
                rng.fill_bytes(&mut out[at..end]);
            }
        }
    }
    out
}

/// Drives `job` over `input` using at most `chunk_len` input bytes and an
/// `output_len` output buffer per call, returning everything it produced.
///
/// End of input is only signalled once the whole of `input` has been
/// offered. A job blocked on its basis is simply called again.
///
/// # Errors
///
/// Propagates the job's error. A job that stops making progress fails with
/// [`JobError::Aborted`].
pub fn drive_chunked<S: JobStep>(
    job: &mut Job<S>,
    input: &[u8],
    chunk_len: usize,
    output_len: usize,
) -> Result<Vec<u8>, JobError> {
    let chunk_len = chunk_len.max(1);
    let mut output = vec![0u8; output_len.max(1)];
    let mut produced = Vec::new();
    let mut offset = 0usize;
    let mut idle = 0usize;

    loop {
        let end = (offset + chunk_len).min(input.len());
        let eof = end == input.len();
        let step = job.iterate(&input[offset..end], eof, &mut output)?;
        produced.extend_from_slice(&output[..step.produced]);
        offset += step.consumed;

        if step.consumed == 0 && step.produced == 0 {
            idle += 1;
            if idle > MAX_IDLE_ITERATIONS {
                return Err(JobError::Aborted);
            }
        } else {
            idle = 0;
        }

        match step.status {
            JobStatus::Done => return Ok(produced),
            JobStatus::Blocked(BlockedOn::Input) if eof => return Err(JobError::Aborted),
            JobStatus::Blocked(_) => {}
        }
    }
}

/// Drives `job` over `input` in one chunk with a generously sized output.
///
/// # Errors
///
/// Propagates the job's error.
pub fn drive_all<S: JobStep>(job: &mut Job<S>, input: &[u8]) -> Result<Vec<u8>, JobError> {
    drive_chunked(job, input, input.len(), input.len().max(64 * 1024))
}

/// Writes `data` to a fresh temporary file.
///
/// # Errors
///
/// Returns the I/O error raised while creating or writing the file.
pub fn basis_file(data: &[u8]) -> io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file)
}
