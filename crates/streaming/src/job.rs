//! crates/streaming/src/job.rs
//! Job wrapper that owns the terminal state of a step implementation.

use logging::debug_log;

use crate::{Buffers, JobError, JobStatus, Step};

/// One resumable operation driven through [`Job`].
///
/// An implementation consumes from and writes to the supplied [`Buffers`],
/// keeping whatever partial state it needs between calls. It must make all
/// the progress the buffers allow before returning and must only report
/// [`BlockedOn::Input`](crate::BlockedOn::Input) when every input byte has
/// been consumed and the chunk was not the last one.
pub trait JobStep {
    /// Short name used in diagnostics.
    const NAME: &'static str;

    /// Advances the operation.
    fn step(&mut self, buffers: &mut Buffers<'_>) -> Result<JobStatus, JobError>;
}

/// Counters accumulated across iterations.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct JobStats {
    /// Number of [`Job::iterate`] calls that reached the step implementation.
    pub iterations: u64,
    /// Total input bytes consumed.
    pub bytes_in: u64,
    /// Total output bytes produced.
    pub bytes_out: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum JobState {
    Running,
    Finished,
    Aborted,
}

/// Owned execution state of one streaming operation.
///
/// Dropping a job at any iteration boundary cancels it; there is nothing to
/// roll back.
#[derive(Debug)]
pub struct Job<S> {
    inner: S,
    state: JobState,
    stats: JobStats,
}

impl<S: JobStep> Job<S> {
    /// Wraps a step implementation in a running job.
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            state: JobState::Running,
            stats: JobStats {
                iterations: 0,
                bytes_in: 0,
                bytes_out: 0,
            },
        }
    }

    /// Runs one iteration over `input` into `output`.
    ///
    /// `eof` marks `input` as the final chunk. Output is written to the front
    /// of `output`; [`Step::produced`] says how much of it is valid.
    pub fn iterate(
        &mut self,
        input: &[u8],
        eof: bool,
        output: &mut [u8],
    ) -> Result<Step, JobError> {
        match self.state {
            JobState::Running => {}
            JobState::Finished => return Err(JobError::Finished),
            JobState::Aborted => return Err(JobError::Aborted),
        }

        let mut buffers = Buffers::new(input, eof, output);
        let result = self.inner.step(&mut buffers);
        let consumed = buffers.consumed();
        let produced = buffers.produced();

        self.stats.iterations += 1;
        self.stats.bytes_in += consumed as u64;
        self.stats.bytes_out += produced as u64;

        match result {
            Ok(status) => {
                if status.is_done() {
                    self.state = JobState::Finished;
                    debug_log!(
                        Job,
                        1,
                        "{} job done: {} bytes in, {} bytes out, {} iterations",
                        S::NAME,
                        self.stats.bytes_in,
                        self.stats.bytes_out,
                        self.stats.iterations
                    );
                } else {
                    debug_log!(
                        Job,
                        3,
                        "{} job {:?}: consumed {consumed}, produced {produced}",
                        S::NAME,
                        status
                    );
                }
                Ok(Step {
                    status,
                    consumed,
                    produced,
                    unused_input: input.len() - consumed,
                })
            }
            Err(error) => {
                self.state = JobState::Aborted;
                debug_log!(Job, 1, "{} job aborted: {error}", S::NAME);
                Err(error)
            }
        }
    }

    /// Returns `true` once the job has reported [`JobStatus::Done`].
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == JobState::Finished
    }

    /// Returns `true` once the job has failed.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.state == JobState::Aborted
    }

    /// Returns the accumulated counters.
    #[must_use]
    pub const fn stats(&self) -> JobStats {
        self.stats
    }

    /// Borrows the step implementation.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Consumes the job and returns the step implementation.
    pub fn into_inner(self) -> S {
        self.inner
    }
}
