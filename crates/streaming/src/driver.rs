//! crates/streaming/src/driver.rs
//! Caller-side loops that feed a [`Job`] and collect its output.
//!
//! [`iterate_growing`] runs one iteration over a caller chunk into a growable
//! buffer, which is the shape an embedding layer exposes to its own callers.
//! [`run_to_end`] drives a job from an [`io::Read`] into an [`io::Write`].

use std::io::{self, Read, Write};

use logging::debug_log;
use thiserror::Error;

use crate::{BlockedOn, Job, JobError, JobStats, JobStatus, JobStep};

/// Default chunk and initial output length used by the drivers.
pub const IO_BUFFER_SIZE: usize = 64 * 1024;

/// Buffer sizing for [`run_to_end`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriverConfig {
    /// Maximum number of input bytes offered per iteration.
    pub chunk_len: usize,
    /// Length of the output buffer before any growth.
    pub initial_output_len: usize,
}

impl DriverConfig {
    /// Creates a configuration with the given chunk and output lengths.
    ///
    /// Zero lengths are raised to one byte.
    #[must_use]
    pub const fn new(chunk_len: usize, initial_output_len: usize) -> Self {
        Self {
            chunk_len: if chunk_len == 0 { 1 } else { chunk_len },
            initial_output_len: if initial_output_len == 0 {
                1
            } else {
                initial_output_len
            },
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new(IO_BUFFER_SIZE, IO_BUFFER_SIZE)
    }
}

/// Failure while driving a job from a reader into a writer.
#[derive(Debug, Error)]
pub enum DriveError {
    /// The job failed.
    #[error(transparent)]
    Job(#[from] JobError),
    /// Reading input or writing output failed.
    #[error("i/o error while driving job: {0}")]
    Io(#[from] io::Error),
}

/// Result of [`iterate_growing`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Iteration {
    /// Final status. Never [`BlockedOn::Output`]; the buffer is grown instead.
    pub status: JobStatus,
    /// Trailing input bytes the job did not consume.
    pub unused_input: usize,
    /// Bytes appended to the output vector.
    pub produced: usize,
}

impl Iteration {
    /// Returns `true` when the job finished.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.status.is_done()
    }
}

/// Returns the next output length for a buffer of `current` bytes.
#[must_use]
pub const fn grown_len(current: usize) -> usize {
    let doubled = current.saturating_mul(2);
    if doubled > IO_BUFFER_SIZE {
        doubled
    } else {
        IO_BUFFER_SIZE
    }
}

/// Runs one iteration of `job` over `input`, appending output to `output`.
///
/// An empty `input` signals end of stream. When the job fills the spare
/// space of `output` the vector is grown to `max(IO_BUFFER_SIZE, 2 × len)` and
/// the iteration continues, so the call only returns once the job needs more
/// input, finished, or is waiting on its basis source.
pub fn iterate_growing<S: JobStep>(
    job: &mut Job<S>,
    input: &[u8],
    output: &mut Vec<u8>,
) -> Result<Iteration, JobError> {
    let eof = input.is_empty();
    let start = output.len();
    let mut produced = 0usize;
    let mut consumed = 0usize;

    if output.capacity() == start {
        output.reserve(IO_BUFFER_SIZE);
    }
    output.resize(output.capacity(), 0);

    let result = loop {
        let step = match job.iterate(&input[consumed..], eof, &mut output[start + produced..]) {
            Ok(step) => step,
            Err(error) => break Err(error),
        };
        consumed += step.consumed;
        produced += step.produced;

        match step.status {
            JobStatus::Blocked(BlockedOn::Output) => {
                let new_len = grown_len(output.len());
                debug_log!(Io, 2, "growing job output buffer to {new_len} bytes");
                output.resize(new_len, 0);
            }
            status => {
                break Ok(Iteration {
                    status,
                    unused_input: input.len() - consumed,
                    produced,
                });
            }
        }
    };

    output.truncate(start + produced);
    result
}

/// Drives `job` to completion, reading input from `reader` and writing
/// output to `writer`.
///
/// A job that reports [`BlockedOn::Basis`] cannot make progress under this
/// blocking loop; the call fails with an [`io::ErrorKind::WouldBlock`] error.
pub fn run_to_end<S, R, W>(
    job: &mut Job<S>,
    reader: &mut R,
    writer: &mut W,
    config: DriverConfig,
) -> Result<JobStats, DriveError>
where
    S: JobStep,
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let config = DriverConfig::new(config.chunk_len, config.initial_output_len);
    let mut input = Vec::with_capacity(config.chunk_len);
    let mut output = vec![0u8; config.initial_output_len];
    let mut eof = false;

    loop {
        if !eof && input.len() < config.chunk_len {
            let start = input.len();
            input.resize(config.chunk_len, 0);
            let read = read_retrying(reader, &mut input[start..])?;
            input.truncate(start + read);
            eof = read == 0;
        }

        let step = job.iterate(&input, eof, &mut output)?;
        writer.write_all(&output[..step.produced])?;
        input.drain(..step.consumed);

        match step.status {
            JobStatus::Done => {
                writer.flush()?;
                return Ok(job.stats());
            }
            JobStatus::Blocked(BlockedOn::Output) => {
                if step.produced == 0 {
                    let new_len = grown_len(output.len());
                    output.resize(new_len, 0);
                }
            }
            JobStatus::Blocked(BlockedOn::Input) => {
                if eof {
                    return Err(DriveError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "job requested input after end of stream",
                    )));
                }
            }
            JobStatus::Blocked(BlockedOn::Basis) => {
                return Err(DriveError::Io(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    "basis source would block",
                )));
            }
        }
    }
}

fn read_retrying<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
}
