//! crates/streaming/src/status.rs

/// Why a job stopped before finishing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BlockedOn {
    /// Every input byte was consumed and the stream has not ended.
    Input,
    /// The output buffer is full. No input was lost.
    Output,
    /// The basis source reported that a read would block.
    ///
    /// Only the patch applier returns this. Call again once the source is
    /// ready; the pending copy resumes where it stopped.
    Basis,
}

/// Outcome of a successful iteration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum JobStatus {
    /// The operation finished. Further calls fail with [`JobError::Finished`](crate::JobError::Finished).
    Done,
    /// The operation needs the caller to act before it can continue.
    Blocked(BlockedOn),
}

impl JobStatus {
    /// Returns `true` for [`JobStatus::Done`].
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Accounting for one call to [`Job::iterate`](crate::Job::iterate).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Step {
    /// Status reported by the job.
    pub status: JobStatus,
    /// Input bytes the job took ownership of.
    pub consumed: usize,
    /// Output bytes written to the front of the caller's buffer.
    pub produced: usize,
    /// Input bytes left untouched. They must be offered again unless the job is done.
    pub unused_input: usize,
}
