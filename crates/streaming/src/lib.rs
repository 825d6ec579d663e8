#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `streaming` is the execution model shared by every deltasync job. A job is
//! a single-threaded state machine that is driven in small steps: each call to
//! [`Job::iterate`] hands it a bounded input chunk and a bounded output buffer,
//! and the job consumes and produces as much as fits before reporting a
//! [`JobStatus`].
//!
//! # Design
//!
//! - [`Buffers`] is the cursor pair a job step reads from and writes into.
//! - [`JobStep`] is implemented by the concrete jobs (signature builder,
//!   signature loader, delta encoder, patch applier).
//! - [`Job`] wraps a step implementation and owns the terminal state: after
//!   [`JobStatus::Done`] every further call fails with [`JobError::Finished`],
//!   after any error with [`JobError::Aborted`].
//! - [`PendingOutput`] holds bytes a job has produced but could not yet place
//!   in the caller's output buffer.
//! - The [`driver`] module provides the two caller loops: a single iteration
//!   into a growable `Vec<u8>` and a reader-to-writer loop.
//!
//! A job never blocks waiting for input. Running out of input yields
//! [`BlockedOn::Input`] and the caller supplies more on the next call,
//! flagging the final chunk with `eof`. Input the job did not consume is
//! reported back through [`Step::unused_input`] and must be offered again.
//!
//! # Examples
//!
//! ```
//! use streaming::{Buffers, Job, JobError, JobStatus, JobStep, BlockedOn};
//!
//! /// Upper-cases its input.
//! struct Upper;
//!
//! impl JobStep for Upper {
//!     const NAME: &'static str = "upper";
//!
//!     fn step(&mut self, buffers: &mut Buffers<'_>) -> Result<JobStatus, JobError> {
//!         let input = buffers.input();
//!         let n = input.len().min(buffers.output_remaining());
//!         for (dst, src) in buffers.output_mut()[..n].iter_mut().zip(input) {
//!             *dst = src.to_ascii_uppercase();
//!         }
//!         buffers.consume(n);
//!         buffers.advance_output(n);
//!         if !buffers.input().is_empty() {
//!             Ok(JobStatus::Blocked(BlockedOn::Output))
//!         } else if buffers.is_eof() {
//!             Ok(JobStatus::Done)
//!         } else {
//!             Ok(JobStatus::Blocked(BlockedOn::Input))
//!         }
//!     }
//! }
//!
//! let mut job = Job::new(Upper);
//! let mut out = [0u8; 8];
//! let step = job.iterate(b"abc", true, &mut out).expect("iterate");
//! assert_eq!(step.status, JobStatus::Done);
//! assert_eq!(&out[..step.produced], b"ABC");
//! ```

mod buffers;
pub mod driver;
mod error;
mod job;
mod pending;
mod status;

pub use buffers::Buffers;
pub use driver::{DriveError, DriverConfig, IO_BUFFER_SIZE, Iteration, iterate_growing, run_to_end};
pub use error::JobError;
pub use job::{Job, JobStats, JobStep};
pub use pending::PendingOutput;
pub use status::{BlockedOn, JobStatus, Step};
