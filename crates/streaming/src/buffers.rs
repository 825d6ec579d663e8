//! crates/streaming/src/buffers.rs
//! Input and output cursors handed to a job step.

/// The bounded input chunk and output buffer of one iteration.
///
/// Both sides are tracked with a cursor. A step advances the input cursor
/// with [`consume`](Self::consume) once it has taken ownership of bytes and
/// advances the output cursor with [`advance_output`](Self::advance_output)
/// or [`write`](Self::write) once bytes are placed.
#[derive(Debug)]
pub struct Buffers<'a> {
    input: &'a [u8],
    in_pos: usize,
    eof: bool,
    output: &'a mut [u8],
    out_pos: usize,
}

impl<'a> Buffers<'a> {
    /// Creates cursors over `input` and `output`.
    ///
    /// `eof` is `true` when `input` is the final chunk of the stream.
    pub fn new(input: &'a [u8], eof: bool, output: &'a mut [u8]) -> Self {
        Self {
            input,
            in_pos: 0,
            eof,
            output,
            out_pos: 0,
        }
    }

    /// Returns the input that has not been consumed yet.
    #[must_use]
    pub fn input(&self) -> &'a [u8] {
        &self.input[self.in_pos..]
    }

    /// Marks `n` input bytes as consumed.
    ///
    /// `n` is clamped to the remaining input.
    pub fn consume(&mut self, n: usize) {
        self.in_pos = (self.in_pos + n).min(self.input.len());
    }

    /// Consumes up to `max` bytes and returns them.
    pub fn take_input(&mut self, max: usize) -> &'a [u8] {
        let input = self.input;
        let end = self.in_pos + max.min(input.len() - self.in_pos);
        let taken = &input[self.in_pos..end];
        self.in_pos = end;
        taken
    }

    /// Returns `true` when the caller flagged this chunk as the last one.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.eof
    }

    /// Returns `true` when the stream has ended and every input byte was consumed.
    #[must_use]
    pub fn input_exhausted(&self) -> bool {
        self.eof && self.in_pos == self.input.len()
    }

    /// Number of output bytes that can still be written.
    #[must_use]
    pub fn output_remaining(&self) -> usize {
        self.output.len() - self.out_pos
    }

    /// Returns the unwritten part of the output buffer.
    pub fn output_mut(&mut self) -> &mut [u8] {
        &mut self.output[self.out_pos..]
    }

    /// Marks `n` bytes of [`output_mut`](Self::output_mut) as written.
    pub fn advance_output(&mut self, n: usize) {
        self.out_pos = (self.out_pos + n).min(self.output.len());
    }

    /// Copies as much of `data` as fits and returns the number of bytes written.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.output_remaining());
        self.output[self.out_pos..self.out_pos + n].copy_from_slice(&data[..n]);
        self.out_pos += n;
        n
    }

    /// Number of input bytes consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.in_pos
    }

    /// Number of output bytes produced so far.
    #[must_use]
    pub const fn produced(&self) -> usize {
        self.out_pos
    }
}
