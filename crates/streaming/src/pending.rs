//! crates/streaming/src/pending.rs

use crate::Buffers;

/// Bytes a job has produced but not yet handed to the caller.
///
/// Jobs stage encoded records here and flush them into the caller's output
/// buffer whenever there is room. A job should flush before it takes more
/// input so the queue stays bounded by the size of a single record.
#[derive(Clone, Debug, Default)]
pub struct PendingOutput {
    buf: Vec<u8>,
    pos: usize,
}

impl PendingOutput {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// Appends `bytes` to the queue.
    pub fn push(&mut self, bytes: &[u8]) {
        if self.pos == self.buf.len() {
            self.buf.clear();
            self.pos = 0;
        }
        self.buf.extend_from_slice(bytes);
    }

    /// Number of bytes waiting to be flushed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns `true` when nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Moves as many queued bytes as fit into `buffers`.
    ///
    /// Returns `true` when the queue is empty afterwards.
    pub fn flush(&mut self, buffers: &mut Buffers<'_>) -> bool {
        let written = buffers.write(&self.buf[self.pos..]);
        self.pos += written;
        if self.pos == self.buf.len() {
            self.buf.clear();
            self.pos = 0;
            true
        } else {
            false
        }
    }
}
