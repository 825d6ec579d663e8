//! Integration tests for the iteration contract shared by all jobs.
//!
//! These tests drive small reference jobs through `Job::iterate` with
//! varying chunk and buffer sizes and verify that the produced stream does
//! not depend on how the caller slices input or sizes output.

use proptest::prelude::*;
use streaming::{
    BlockedOn, Buffers, DriverConfig, Job, JobError, JobStatus, JobStep, PendingOutput,
    iterate_growing, run_to_end,
};

/// Emits the input framed as `len:u8 payload` records of at most 4 bytes,
/// followed by a zero terminator once the input ends.
#[derive(Default)]
struct Framer {
    pending: PendingOutput,
    terminated: bool,
}

impl JobStep for Framer {
    const NAME: &'static str = "framer";

    fn step(&mut self, buffers: &mut Buffers<'_>) -> Result<JobStatus, JobError> {
        loop {
            if !self.pending.flush(buffers) {
                return Ok(JobStatus::Blocked(BlockedOn::Output));
            }
            if self.terminated {
                return Ok(JobStatus::Done);
            }
            let chunk = buffers.take_input(4);
            if !chunk.is_empty() {
                self.pending.push(&[chunk.len() as u8]);
                self.pending.push(chunk);
                continue;
            }
            if buffers.is_eof() {
                self.pending.push(&[0]);
                self.terminated = true;
                continue;
            }
            return Ok(JobStatus::Blocked(BlockedOn::Input));
        }
    }
}

fn frame_reference(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in data.chunks(4) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
    out.push(0);
    out
}

fn drive_chunked(data: &[u8], chunk_len: usize, out_len: usize) -> Vec<u8> {
    let mut job = Job::new(Framer::default());
    let mut collected = Vec::new();
    let mut out = vec![0u8; out_len];
    let mut offset = 0;

    loop {
        let end = (offset + chunk_len).min(data.len());
        let eof = end == data.len();
        let step = job
            .iterate(&data[offset..end], eof, &mut out)
            .expect("iterate");
        collected.extend_from_slice(&out[..step.produced]);
        offset += step.consumed;
        if step.status == JobStatus::Done {
            return collected;
        }
    }
}

// ============================================================================
// Chunking Invariance
// ============================================================================

#[test]
fn one_byte_at_a_time_matches_single_call() {
    let data: Vec<u8> = (0..=200).collect();
    assert_eq!(drive_chunked(&data, 1, 1), frame_reference(&data));
    assert_eq!(drive_chunked(&data, data.len(), 4096), frame_reference(&data));
}

#[test]
fn empty_stream_finishes_with_terminator() {
    assert_eq!(drive_chunked(&[], 1, 1), vec![0]);
}

proptest! {
    #[test]
    fn output_is_independent_of_slicing(
        data in prop::collection::vec(any::<u8>(), 0..512),
        chunk_len in 1usize..64,
        out_len in 1usize..32,
    ) {
        prop_assert_eq!(drive_chunked(&data, chunk_len, out_len), frame_reference(&data));
    }
}

// ============================================================================
// Drivers
// ============================================================================

#[test]
fn iterate_growing_matches_reference() {
    let data = vec![9u8; 100_000];
    let mut job = Job::new(Framer::default());
    let mut output = Vec::new();

    let first = iterate_growing(&mut job, &data, &mut output).expect("feed");
    assert_eq!(first.status, JobStatus::Blocked(BlockedOn::Input));
    let last = iterate_growing(&mut job, &[], &mut output).expect("finish");
    assert!(last.is_done());
    assert_eq!(last.unused_input, 0);
    assert_eq!(output, frame_reference(&data));
}

#[test]
fn run_to_end_matches_reference_with_default_config() {
    let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let mut job = Job::new(Framer::default());
    let mut written = Vec::new();
    run_to_end(&mut job, &mut data.as_slice(), &mut written, DriverConfig::default())
        .expect("run");
    assert_eq!(written, frame_reference(&data));
}

#[cfg(feature = "serde")]
#[test]
fn driver_config_loads_from_json() {
    let config: DriverConfig =
        serde_json::from_str(r#"{"chunk_len": 4096}"#).expect("parse config");
    assert_eq!(config.chunk_len, 4096);
    assert_eq!(
        config.initial_output_len,
        DriverConfig::default().initial_output_len
    );
}
