//! crates/match/src/apply.rs
//!
//! Patch application against a random-access basis.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

use logging::debug_log;
use streaming::{BlockedOn, Buffers, DriverConfig, Job, JobError, JobStatus, JobStep};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::DeltaError;
use crate::wire::{self, Command, MAGIC_LEN, MAX_PARAMS_LEN};

/// Random-access view of the basis used by [`PatchApplier`].
///
/// This is the only point where patch application may wait on the outside
/// world. A source that cannot answer yet returns
/// [`io::ErrorKind::WouldBlock`]; the job then reports
/// [`BlockedOn::Basis`] and repeats the read on the next iteration.
pub trait BasisSource {
    /// Reads up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returning `Ok(0)` for a non-empty `buf` means the basis has no bytes
    /// at `offset`. Short reads are fine; the applier asks again for the
    /// rest. A read failing with [`io::ErrorKind::Interrupted`] is issued
    /// again immediately, so implementations need not loop on it. Any other
    /// retry policy belongs to the source.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;
}

impl BasisSource for &[u8] {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        let Some(available) = self.get(start..) else {
            return Ok(0);
        };
        let len = available.len().min(buf.len());
        buf[..len].copy_from_slice(&available[..len]);
        Ok(len)
    }
}

impl BasisSource for Vec<u8> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.as_slice().read_at(offset, buf)
    }
}

impl<B: BasisSource + ?Sized> BasisSource for &mut B {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }
}

impl<B: BasisSource + ?Sized> BasisSource for Box<B> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }
}

#[cfg(unix)]
impl BasisSource for File {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }
}

#[cfg(windows)]
impl BasisSource for File {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }
}

#[cfg(not(any(unix, windows)))]
impl BasisSource for File {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.seek(SeekFrom::Start(offset))?;
        self.read(buf)
    }
}

/// [`BasisSource`] over any seekable reader.
///
/// Seeks are skipped when reads are sequential.
#[derive(Debug)]
pub struct SeekSource<R> {
    inner: R,
    position: Option<u64>,
}

impl<R: Read + Seek> SeekSource<R> {
    /// Wraps `inner`.
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            position: None,
        }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> BasisSource for SeekSource<R> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        if self.position != Some(offset) {
            self.position = None;
            self.inner.seek(SeekFrom::Start(offset))?;
        }
        let read = self.inner.read(buf)?;
        self.position = Some(offset + read as u64);
        Ok(read)
    }
}

#[derive(Debug)]
enum ApplyState {
    Magic {
        buf: [u8; MAGIC_LEN],
        filled: usize,
    },
    Command,
    Params {
        tag: u8,
        buf: [u8; MAX_PARAMS_LEN],
        need: usize,
        filled: usize,
    },
    Literal {
        remaining: u64,
    },
    Copy {
        offset: u64,
        remaining: u64,
    },
    Done,
}

/// Counters reported by a [`PatchApplier`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ApplyStats {
    /// COPY commands applied.
    pub copy_commands: u64,
    /// Bytes read from the basis.
    pub copy_bytes: u64,
    /// LITERAL commands applied.
    pub literal_commands: u64,
    /// Literal bytes written.
    pub literal_bytes: u64,
    /// Basis reads that reported they would block.
    pub basis_waits: u64,
}

/// Streaming patch applier.
///
/// Consumes a delta stream and writes the reconstructed target. COPY data is
/// read from the basis straight into the caller's output buffer. Input left
/// after the END command is not consumed.
#[derive(Debug)]
pub struct PatchApplier<B> {
    basis: B,
    state: ApplyState,
    stats: ApplyStats,
}

impl<B: BasisSource> PatchApplier<B> {
    /// Creates an applier reading copies from `basis`.
    pub const fn new(basis: B) -> Self {
        Self {
            basis,
            state: ApplyState::Magic {
                buf: [0u8; MAGIC_LEN],
                filled: 0,
            },
            stats: ApplyStats {
                copy_commands: 0,
                copy_bytes: 0,
                literal_commands: 0,
                literal_bytes: 0,
                basis_waits: 0,
            },
        }
    }

    /// Starts a patch job.
    pub const fn begin(basis: B) -> Job<Self> {
        Job::new(Self::new(basis))
    }

    /// Returns the counters gathered so far.
    pub const fn stats(&self) -> ApplyStats {
        self.stats
    }

    /// Returns the basis source.
    pub const fn basis(&self) -> &B {
        &self.basis
    }

    /// Consumes the applier, returning the basis source.
    pub fn into_basis(self) -> B {
        self.basis
    }

    fn start_command(&mut self, command: Command) {
        self.state = match command {
            Command::End => {
                debug_log!(
                    Patch,
                    1,
                    "patch done: {} bytes copied in {} commands, {} literal bytes in {} commands",
                    self.stats.copy_bytes,
                    self.stats.copy_commands,
                    self.stats.literal_bytes,
                    self.stats.literal_commands
                );
                ApplyState::Done
            }
            Command::Literal { len } => {
                debug_log!(Patch, 3, "literal {len} bytes");
                self.stats.literal_commands += 1;
                ApplyState::Literal { remaining: len }
            }
            Command::Copy { offset, len } => {
                debug_log!(Patch, 3, "copy {len} bytes from basis offset {offset}");
                self.stats.copy_commands += 1;
                ApplyState::Copy {
                    offset,
                    remaining: len,
                }
            }
        };
    }
}

fn truncated(what: &str) -> JobError {
    JobError::malformed_delta(format!("delta stream ended inside {what}"))
}

impl<B: BasisSource> JobStep for PatchApplier<B> {
    const NAME: &'static str = "patch";

    fn step(&mut self, buffers: &mut Buffers<'_>) -> Result<JobStatus, JobError> {
        loop {
            match &mut self.state {
                ApplyState::Magic { buf, filled } => {
                    let data = buffers.take_input(MAGIC_LEN - *filled);
                    buf[*filled..*filled + data.len()].copy_from_slice(data);
                    *filled += data.len();
                    if *filled < MAGIC_LEN {
                        if buffers.is_eof() {
                            return Err(truncated("the header"));
                        }
                        return Ok(JobStatus::Blocked(BlockedOn::Input));
                    }
                    wire::check_magic(buf)?;
                    self.state = ApplyState::Command;
                }
                ApplyState::Command => {
                    let Some(&tag) = buffers.input().first() else {
                        if buffers.is_eof() {
                            return Err(truncated("the command list"));
                        }
                        return Ok(JobStatus::Blocked(BlockedOn::Input));
                    };
                    buffers.consume(1);
                    let need = wire::params_len(tag)?;
                    if need == 0 {
                        let command = wire::decode_command(tag, &[])?;
                        self.start_command(command);
                    } else {
                        self.state = ApplyState::Params {
                            tag,
                            buf: [0u8; MAX_PARAMS_LEN],
                            need,
                            filled: 0,
                        };
                    }
                }
                ApplyState::Params {
                    tag,
                    buf,
                    need,
                    filled,
                } => {
                    let data = buffers.take_input(*need - *filled);
                    buf[*filled..*filled + data.len()].copy_from_slice(data);
                    *filled += data.len();
                    if *filled < *need {
                        if buffers.is_eof() {
                            return Err(truncated("a command header"));
                        }
                        return Ok(JobStatus::Blocked(BlockedOn::Input));
                    }
                    let command = wire::decode_command(*tag, &buf[..*need])?;
                    self.start_command(command);
                }
                ApplyState::Literal { remaining } => {
                    if buffers.output_remaining() == 0 {
                        return Ok(JobStatus::Blocked(BlockedOn::Output));
                    }
                    let max = usize::try_from(*remaining)
                        .unwrap_or(usize::MAX)
                        .min(buffers.output_remaining());
                    let data = buffers.take_input(max);
                    buffers.write(data);
                    *remaining -= data.len() as u64;
                    self.stats.literal_bytes += data.len() as u64;

                    if *remaining == 0 {
                        self.state = ApplyState::Command;
                    } else if buffers.input().is_empty() {
                        if buffers.is_eof() {
                            return Err(truncated("a literal"));
                        }
                        return Ok(JobStatus::Blocked(BlockedOn::Input));
                    }
                }
                ApplyState::Copy { offset, remaining } => {
                    if buffers.output_remaining() == 0 {
                        return Ok(JobStatus::Blocked(BlockedOn::Output));
                    }
                    let want = usize::try_from(*remaining)
                        .unwrap_or(usize::MAX)
                        .min(buffers.output_remaining());
                    match self.basis.read_at(*offset, &mut buffers.output_mut()[..want]) {
                        Ok(0) => {
                            return Err(JobError::TruncatedBasis {
                                offset: *offset,
                                missing: *remaining,
                            });
                        }
                        Ok(read) => {
                            let read = read.min(want);
                            buffers.advance_output(read);
                            *offset += read as u64;
                            *remaining -= read as u64;
                            self.stats.copy_bytes += read as u64;
                            if *remaining == 0 {
                                self.state = ApplyState::Command;
                            }
                        }
                        Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                        Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                            self.stats.basis_waits += 1;
                            debug_log!(Io, 2, "basis read at {offset} would block");
                            return Ok(JobStatus::Blocked(BlockedOn::Basis));
                        }
                        Err(source) => {
                            return Err(JobError::BasisIo {
                                offset: *offset,
                                source,
                            });
                        }
                    }
                }
                ApplyState::Done => return Ok(JobStatus::Done),
            }
        }
    }
}

/// Applies the delta read from `delta` to `basis`, writing the target to
/// `writer`.
///
/// A basis that reports [`io::ErrorKind::WouldBlock`] cannot be served by
/// this blocking helper; drive a [`PatchApplier`] job directly instead.
///
/// # Errors
///
/// Returns [`DeltaError::Job`] for corrupt deltas and basis failures and
/// [`DeltaError::Io`] when reading the delta or writing the target fails.
#[cfg_attr(feature = "tracing", instrument(skip_all, name = "apply_delta"))]
pub fn apply_delta<R, B, W>(delta: &mut R, basis: B, writer: &mut W) -> Result<ApplyStats, DeltaError>
where
    R: Read + ?Sized,
    B: BasisSource,
    W: Write + ?Sized,
{
    let mut job = PatchApplier::begin(basis);
    streaming::run_to_end(&mut job, delta, writer, DriverConfig::default())?;
    Ok(job.inner().stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{DeltaScript, DeltaToken};

    fn delta(tokens: Vec<DeltaToken>) -> Vec<u8> {
        DeltaScript::new(tokens).to_bytes()
    }

    fn apply<B: BasisSource>(basis: B, delta: &[u8]) -> Result<Vec<u8>, JobError> {
        let mut job = PatchApplier::begin(basis);
        let mut output = vec![0u8; 4096];
        let step = job.iterate(delta, true, &mut output)?;
        assert!(step.status.is_done());
        output.truncate(step.produced);
        Ok(output)
    }

    #[test]
    fn literal_and_copy_reconstruct_target() {
        let basis = b"0123456789".as_slice();
        let delta = delta(vec![
            DeltaToken::Copy { offset: 2, len: 3 },
            DeltaToken::Literal(b"-".to_vec()),
            DeltaToken::Copy { offset: 8, len: 2 },
        ]);
        assert_eq!(apply(basis, &delta).expect("apply"), b"234-89");
    }

    #[test]
    fn empty_basis_with_literal() {
        let delta = delta(vec![DeltaToken::Literal(b"hello".to_vec())]);
        assert_eq!(apply(Vec::new(), &delta).expect("apply"), b"hello");
    }

    #[test]
    fn copy_past_basis_end_is_truncated_basis() {
        let delta = delta(vec![DeltaToken::Copy { offset: 8, len: 5 }]);
        let error = apply(b"0123456789".as_slice(), &delta).expect_err("short basis");
        assert!(matches!(
            error,
            JobError::TruncatedBasis {
                offset: 10,
                missing: 3
            }
        ));
    }

    #[test]
    fn trailing_input_after_end_is_left_unused() {
        let mut bytes = delta(vec![DeltaToken::Literal(b"x".to_vec())]);
        bytes.extend_from_slice(b"tail");
        let mut job = PatchApplier::begin(Vec::new());
        let mut output = [0u8; 16];
        let step = job.iterate(&bytes, true, &mut output).expect("apply");
        assert!(step.status.is_done());
        assert_eq!(step.unused_input, 4);
    }

    #[test]
    fn missing_end_is_malformed() {
        let mut bytes = delta(vec![DeltaToken::Literal(b"abc".to_vec())]);
        bytes.pop();
        assert!(matches!(
            apply(Vec::new(), &bytes),
            Err(JobError::MalformedDelta(_))
        ));
    }

    #[test]
    fn bad_magic_is_malformed() {
        let mut bytes = delta(Vec::new());
        bytes[3] = 0;
        assert!(matches!(
            apply(Vec::new(), &bytes),
            Err(JobError::MalformedDelta(_))
        ));
    }

    #[test]
    fn small_output_blocks_and_resumes() {
        let basis = b"abcdefghij".to_vec();
        let delta = delta(vec![
            DeltaToken::Literal(b"12345".to_vec()),
            DeltaToken::Copy { offset: 0, len: 10 },
        ]);
        let mut job = PatchApplier::begin(basis);
        let mut output = [0u8; 3];
        let mut target = Vec::new();
        let mut offset = 0;
        loop {
            let step = job.iterate(&delta[offset..], true, &mut output).expect("apply");
            target.extend_from_slice(&output[..step.produced]);
            offset += step.consumed;
            if step.status.is_done() {
                break;
            }
            assert_eq!(step.status, JobStatus::Blocked(BlockedOn::Output));
        }
        assert_eq!(target, b"12345abcdefghij");
    }

    struct Failing;

    impl BasisSource for Failing {
        fn read_at(&mut self, _offset: u64, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn basis_errors_are_reported_with_offset() {
        let delta = delta(vec![DeltaToken::Copy { offset: 7, len: 1 }]);
        let error = apply(Failing, &delta).expect_err("failing basis");
        assert!(matches!(error, JobError::BasisIo { offset: 7, .. }));
    }

    /// Fails every other read with `Interrupted`.
    struct Interrupting {
        data: Vec<u8>,
        interrupt: bool,
    }

    impl BasisSource for Interrupting {
        fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into());
            }
            let len = buf.len().min(2);
            self.data.read_at(offset, &mut buf[..len])
        }
    }

    #[test]
    fn interrupted_basis_reads_are_reissued() {
        let basis = Interrupting {
            data: b"0123456789".to_vec(),
            interrupt: false,
        };
        let delta = delta(vec![DeltaToken::Copy { offset: 1, len: 7 }]);
        let mut job = PatchApplier::begin(basis);
        let mut output = vec![0u8; 64];
        let step = job.iterate(&delta, true, &mut output).expect("apply");
        assert!(step.status.is_done());
        assert_eq!(&output[..step.produced], b"1234567");
        assert_eq!(job.inner().stats().basis_waits, 0);
    }

    #[test]
    fn seek_source_reads_any_offset() {
        let mut source = SeekSource::new(io::Cursor::new(b"0123456789".to_vec()));
        let mut buf = [0u8; 3];
        assert_eq!(source.read_at(5, &mut buf).expect("read"), 3);
        assert_eq!(&buf, b"567");
        assert_eq!(source.read_at(8, &mut buf).expect("read"), 2);
        assert_eq!(source.read_at(1, &mut buf).expect("read"), 3);
        assert_eq!(&buf, b"123");
        assert_eq!(source.read_at(20, &mut buf).expect("read"), 0);
    }

    #[test]
    fn slice_source_past_end_reads_nothing() {
        let mut source: &[u8] = b"abc";
        let mut buf = [0u8; 4];
        assert_eq!(source.read_at(3, &mut buf).expect("read"), 0);
        assert_eq!(source.read_at(u64::MAX, &mut buf).expect("read"), 0);
        assert_eq!(source.read_at(1, &mut buf).expect("read"), 2);
    }
}
