//! crates/match/src/generator.rs
//!
//! Rolling-window delta encoder.

use std::io::{Read, Write};
use std::sync::Arc;

use checksums::{RollingChecksum, RollingDigest};
use logging::{debug_log, info_log};
use streaming::{
    BlockedOn, Buffers, DriverConfig, Job, JobError, JobStatus, JobStep, PendingOutput,
};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::DeltaError;
use crate::index::MatchTable;
use crate::wire;

/// Scan buffer size the encoder aims for when pulling input.
const SCAN_CHUNK_LEN: usize = 64 * 1024;

/// Counters reported by a [`DeltaEncoder`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EncodeStats {
    /// Number of COPY commands written.
    pub copy_commands: u64,
    /// Bytes covered by COPY commands.
    pub copy_bytes: u64,
    /// Number of LITERAL commands written.
    pub literal_commands: u64,
    /// Bytes carried as literals.
    pub literal_bytes: u64,
    /// Windows whose weak checksum matched but no strong digest did.
    pub false_alarms: u64,
}

/// Streaming delta encoder over a shared [`MatchTable`].
///
/// The target is fed in chunks of any size. A window of exactly `block_len`
/// bytes slides over it; each window that a basis block reproduces becomes a
/// COPY, and the bytes the window slides past become LITERAL runs. Adjacent
/// copies of contiguous basis ranges are merged into one command.
#[derive(Debug)]
pub struct DeltaEncoder {
    table: Arc<MatchTable>,
    block_len: usize,
    literal_cap: usize,
    scan: Vec<u8>,
    pos: usize,
    target_pos: u64,
    rolling: RollingChecksum,
    rolling_valid: bool,
    outgoing: Option<u8>,
    literal: Vec<u8>,
    pending_copy: Option<(u64, u64)>,
    pending: PendingOutput,
    command: Vec<u8>,
    stats: EncodeStats,
    finished: bool,
}

impl DeltaEncoder {
    /// Creates an encoder that matches against `table`.
    #[must_use]
    pub fn new(table: Arc<MatchTable>) -> Self {
        let block_len = table.block_len();
        let mut pending = PendingOutput::new();
        let mut command = Vec::with_capacity(wire::MAX_PARAMS_LEN + 1);
        wire::encode_magic(&mut command);
        pending.push(&command);

        debug_log!(
            Deltasum,
            1,
            "delta: matching against {} blocks of {} bytes",
            table.len(),
            block_len
        );

        Self {
            table,
            block_len,
            literal_cap: block_len.max(wire::MAX_LITERAL_LEN),
            scan: Vec::new(),
            pos: 0,
            target_pos: 0,
            rolling: RollingChecksum::new(),
            rolling_valid: false,
            outgoing: None,
            literal: Vec::new(),
            pending_copy: None,
            pending,
            command,
            stats: EncodeStats::default(),
            finished: false,
        }
    }

    /// Starts an encoding job.
    #[must_use]
    pub fn begin(table: Arc<MatchTable>) -> Job<Self> {
        Job::new(Self::new(table))
    }

    /// Returns the table the encoder matches against.
    #[must_use]
    pub fn table(&self) -> &MatchTable {
        &self.table
    }

    /// Returns the counters gathered so far.
    #[must_use]
    pub const fn stats(&self) -> EncodeStats {
        self.stats
    }

    fn flush_literal(&mut self) {
        if self.literal.is_empty() {
            return;
        }
        self.command.clear();
        wire::encode_literal_header(self.literal.len() as u64, &mut self.command);
        self.pending.push(&self.command);
        self.pending.push(&self.literal);

        debug_log!(
            Deltasum,
            3,
            "literal {} bytes ending at {}",
            self.literal.len(),
            self.target_pos
        );
        self.stats.literal_commands += 1;
        self.stats.literal_bytes += self.literal.len() as u64;
        self.literal.clear();
    }

    fn flush_copy(&mut self) {
        let Some((offset, len)) = self.pending_copy.take() else {
            return;
        };
        self.command.clear();
        wire::encode_copy(offset, len, &mut self.command);
        self.pending.push(&self.command);

        debug_log!(Deltasum, 3, "copy {len} bytes from basis offset {offset}");
        self.stats.copy_commands += 1;
        self.stats.copy_bytes += len;
    }

    fn push_literal(&mut self, byte: u8) {
        self.flush_copy();
        self.literal.push(byte);
        // Never split a run shorter than one window.
        if self.literal.len() == self.literal_cap {
            self.flush_literal();
        }
    }

    fn push_copy(&mut self, offset: u64, len: u64) {
        self.flush_literal();
        match &mut self.pending_copy {
            Some((start, run)) if *start + *run == offset => *run += len,
            _ => {
                self.flush_copy();
                self.pending_copy = Some((offset, len));
            }
        }
    }

    /// Block following the pending copy, when the copy ends on a block boundary.
    fn next_block_after_copy(&self) -> Option<usize> {
        let (offset, len) = self.pending_copy?;
        let end = offset + len;
        let block_len = self.block_len as u64;
        (end % block_len == 0).then(|| (end / block_len) as usize)
    }

    /// Block aligned with the current target position, if any.
    fn aligned_block(&self) -> Option<usize> {
        let block_len = self.block_len as u64;
        (self.target_pos % block_len == 0).then(|| (self.target_pos / block_len) as usize)
    }

    /// Pulls input into the scan buffer, dropping bytes already accounted for.
    fn refill(&mut self, buffers: &mut Buffers<'_>) -> bool {
        if self.pos > 0 {
            self.scan.drain(..self.pos);
            self.pos = 0;
        }
        let room = self.block_len.max(SCAN_CHUNK_LEN) * 2 - self.scan.len();
        let data = buffers.take_input(room);
        self.scan.extend_from_slice(data);
        !data.is_empty()
    }

    /// Copies the trailing bytes when they reproduce the basis block that
    /// directly follows the pending copy.
    fn try_extend_tail(&mut self) -> bool {
        let tail_len = self.scan.len() - self.pos;
        if tail_len == 0 || !self.literal.is_empty() {
            return false;
        }
        let Some(next) = self.next_block_after_copy() else {
            return false;
        };

        let tail = &self.scan[self.pos..];
        let weak = RollingDigest::from_bytes(tail).value();
        if !self.table.block_matches(next, weak, tail) {
            return false;
        }

        let offset = self.table.block_offset(next);
        self.push_copy(offset, tail_len as u64);
        self.pos += tail_len;
        self.target_pos += tail_len as u64;
        true
    }

    fn finish(&mut self) {
        if !self.try_extend_tail() {
            while self.pos < self.scan.len() {
                let byte = self.scan[self.pos];
                self.pos += 1;
                self.target_pos += 1;
                self.push_literal(byte);
            }
        }
        self.flush_literal();
        self.flush_copy();

        self.command.clear();
        wire::encode_end(&mut self.command);
        self.pending.push(&self.command);
        self.finished = true;

        info_log!(
            Stats,
            1,
            "delta: {} target bytes, {} copied in {} commands, {} literal in {} commands",
            self.target_pos,
            self.stats.copy_bytes,
            self.stats.copy_commands,
            self.stats.literal_bytes,
            self.stats.literal_commands
        );
        debug_log!(
            Hash,
            1,
            "delta: {} false alarms",
            self.stats.false_alarms
        );
    }

    fn window_checksum(&mut self) -> Result<u32, JobError> {
        let window_end = self.pos + self.block_len;
        if let Some(outgoing) = self.outgoing.take() {
            self.rolling
                .roll(outgoing, self.scan[window_end - 1])
                .map_err(|error| JobError::invalid_parameters(error.to_string()))?;
        } else if !self.rolling_valid {
            self.rolling.reset();
            self.rolling.update(&self.scan[self.pos..window_end]);
            self.rolling_valid = true;
        }
        Ok(self.rolling.value())
    }
}

impl JobStep for DeltaEncoder {
    const NAME: &'static str = "delta";

    fn step(&mut self, buffers: &mut Buffers<'_>) -> Result<JobStatus, JobError> {
        loop {
            if !self.pending.flush(buffers) {
                return Ok(JobStatus::Blocked(BlockedOn::Output));
            }
            if self.finished {
                return Ok(JobStatus::Done);
            }

            if self.scan.len() - self.pos < self.block_len {
                if self.refill(buffers) {
                    continue;
                }
                if !buffers.is_eof() {
                    return Ok(JobStatus::Blocked(BlockedOn::Input));
                }
                self.finish();
                continue;
            }

            let weak = self.window_checksum()?;
            let found = if self.table.candidates(weak).is_empty() {
                None
            } else {
                let mut hints = [0usize; 2];
                let mut hint_count = 0;
                for hint in [self.aligned_block(), self.next_block_after_copy()]
                    .into_iter()
                    .flatten()
                {
                    hints[hint_count] = hint;
                    hint_count += 1;
                }
                let window = &self.scan[self.pos..self.pos + self.block_len];
                let found = self.table.find(weak, window, &hints[..hint_count]);
                if found.is_none() {
                    self.stats.false_alarms += 1;
                }
                found
            };

            match found {
                Some(index) => {
                    let offset = self.table.block_offset(index);
                    self.push_copy(offset, self.block_len as u64);
                    self.pos += self.block_len;
                    self.target_pos += self.block_len as u64;
                    self.rolling_valid = false;
                }
                None => {
                    let byte = self.scan[self.pos];
                    self.pos += 1;
                    self.target_pos += 1;
                    self.outgoing = Some(byte);
                    self.push_literal(byte);
                }
            }
        }
    }
}

/// Encodes everything `reader` yields against `table`, writing the delta to
/// `writer`.
///
/// # Errors
///
/// Returns [`DeltaError::Io`] when reading the target or writing the delta
/// fails.
#[cfg_attr(
    feature = "tracing",
    instrument(skip_all, fields(blocks = table.len()), name = "generate_delta")
)]
pub fn generate_delta<R, W>(
    table: Arc<MatchTable>,
    reader: &mut R,
    writer: &mut W,
) -> Result<EncodeStats, DeltaError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut job = DeltaEncoder::begin(table);
    streaming::run_to_end(&mut job, reader, writer, DriverConfig::default())?;
    Ok(job.inner().stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{DeltaScript, DeltaToken};
    use signature::{SignatureOptions, signature_of};

    fn table(basis: &[u8], block_len: u32) -> Arc<MatchTable> {
        let options = SignatureOptions::new().with_block_len(block_len);
        Arc::new(MatchTable::build(signature_of(basis, options).expect("signature")))
    }

    fn encode(table: &Arc<MatchTable>, target: &[u8]) -> DeltaScript {
        let mut job = DeltaEncoder::begin(Arc::clone(table));
        let mut output = vec![0u8; target.len() + 1024];
        let step = job.iterate(target, true, &mut output).expect("encode");
        assert!(step.status.is_done());
        DeltaScript::parse(&output[..step.produced]).expect("parse")
    }

    #[test]
    fn replaced_run_in_uniform_basis() {
        let basis = vec![b'A'; 1000];
        let mut target = basis.clone();
        target[500..510].fill(b'B');

        let script = encode(&table(&basis, 10), &target);
        assert_eq!(
            script.tokens(),
            &[
                DeltaToken::Copy { offset: 0, len: 500 },
                DeltaToken::Literal(vec![b'B'; 10]),
                DeltaToken::Copy {
                    offset: 510,
                    len: 490
                },
            ]
        );
    }

    #[test]
    fn empty_basis_yields_single_literal() {
        let script = encode(&table(b"", 2048), b"hello");
        assert_eq!(script.tokens(), &[DeltaToken::Literal(b"hello".to_vec())]);
    }

    #[test]
    fn empty_target_yields_only_end() {
        let script = encode(&table(b"some basis", 4), b"");
        assert!(script.is_empty());
    }

    #[test]
    fn short_target_is_one_literal() {
        let basis = b"abcdefghijklmnop";
        let script = encode(&table(basis, 8), b"abcdefg");
        assert_eq!(script.tokens(), &[DeltaToken::Literal(b"abcdefg".to_vec())]);
    }

    #[test]
    fn short_target_with_large_blocks_is_one_literal() {
        let block_len = 100_000;
        let basis = vec![7u8; 200_000];
        let target: Vec<u8> = (0..70_000u32).map(|i| (i % 251) as u8).collect();
        assert!(target.len() > wire::MAX_LITERAL_LEN);

        let table = table(&basis, block_len);
        let script = encode(&table, &target);
        assert_eq!(script.copy_count(), 0);
        assert_eq!(script.tokens(), &[DeltaToken::Literal(target.clone())]);

        let mut job = DeltaEncoder::begin(table);
        let mut output = vec![0u8; target.len() + 1024];
        job.iterate(&target, true, &mut output).expect("encode");
        assert_eq!(job.inner().stats().literal_commands, 1);
    }

    #[test]
    fn long_literal_runs_split_at_block_len() {
        let block_len = 100_000usize;
        let table = table(&[7u8; 1000], block_len as u32);
        let target: Vec<u8> = (0..250_000u32).map(|i| (i % 249) as u8).collect();

        let script = encode(&table, &target);
        let lens: Vec<u64> = script.tokens().iter().map(DeltaToken::byte_len).collect();
        assert_eq!(lens, [100_000, 100_000, 50_000]);
    }

    #[test]
    fn literal_runs_split_at_max_literal_len_for_small_blocks() {
        let table = table(b"", 2048);
        let target = vec![3u8; wire::MAX_LITERAL_LEN + 10];
        let script = encode(&table, &target);
        let lens: Vec<u64> = script.tokens().iter().map(DeltaToken::byte_len).collect();
        assert_eq!(lens, [wire::MAX_LITERAL_LEN as u64, 10]);
    }

    #[test]
    fn identical_target_is_one_copy_including_short_tail() {
        let basis: Vec<u8> = (0..1003u32).map(|i| (i * 7 % 253) as u8).collect();
        let script = encode(&table(&basis, 10), &basis);
        assert_eq!(
            script.tokens(),
            &[DeltaToken::Copy {
                offset: 0,
                len: 1003
            }]
        );
    }

    #[test]
    fn shifted_target_still_copies() {
        let basis: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 251) as u8).collect();
        let mut target = b"prefix".to_vec();
        target.extend_from_slice(&basis);

        let script = encode(&table(&basis, 64), &target);
        assert_eq!(script.tokens()[0], DeltaToken::Literal(b"prefix".to_vec()));
        assert_eq!(script.literal_bytes(), 6);
        assert_eq!(script.total_bytes(), target.len() as u64);
        assert_eq!(script.apply_to(&basis).expect("apply"), target);
    }

    #[test]
    fn byte_at_a_time_matches_single_call() {
        let basis: Vec<u8> = (0..2000u32).map(|i| (i * 13 % 241) as u8).collect();
        let mut target = basis[700..1500].to_vec();
        target.extend_from_slice(b"--inserted--");
        target.extend_from_slice(&basis[..300]);
        let table = table(&basis, 32);

        let mut job = DeltaEncoder::begin(Arc::clone(&table));
        let mut delta = Vec::new();
        let mut output = [0u8; 1];
        let mut offset = 0;
        loop {
            let end = (offset + 1).min(target.len());
            let step = job
                .iterate(&target[offset..end], end == target.len(), &mut output)
                .expect("iterate");
            delta.extend_from_slice(&output[..step.produced]);
            offset += step.consumed;
            if step.status.is_done() {
                break;
            }
        }

        assert_eq!(DeltaScript::parse(&delta).expect("parse"), encode(&table, &target));
    }

    #[test]
    fn stats_count_commands() {
        let basis = vec![b'A'; 100];
        let mut target = basis.clone();
        target[50] = b'x';
        let mut job = DeltaEncoder::begin(table(&basis, 10));
        let mut output = vec![0u8; 1024];
        job.iterate(&target, true, &mut output).expect("encode");

        let stats = job.inner().stats();
        assert_eq!(stats.copy_bytes + stats.literal_bytes, 100);
        assert_eq!(stats.literal_bytes, 10);
        assert_eq!(stats.copy_commands, 2);
    }
}
