//! crates/match/src/script.rs
//!
//! In-memory view of a delta stream.

use streaming::JobError;

use crate::wire::{self, Command, MAGIC_LEN};

/// One resolved delta command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeltaToken {
    /// Literal byte payload written verbatim to the target.
    Literal(Vec<u8>),
    /// Range of the basis copied to the target.
    Copy {
        /// Byte offset in the basis.
        offset: u64,
        /// Number of bytes copied.
        len: u64,
    },
}

impl DeltaToken {
    /// Returns the number of target bytes produced by this token.
    #[must_use]
    pub fn byte_len(&self) -> u64 {
        match self {
            Self::Literal(bytes) => bytes.len() as u64,
            Self::Copy { len, .. } => *len,
        }
    }

    /// Returns `true` when the token is a literal payload.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

/// Ordered list of [`DeltaToken`] values, without the END marker.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeltaScript {
    tokens: Vec<DeltaToken>,
    total_bytes: u64,
    literal_bytes: u64,
}

impl DeltaScript {
    /// Creates a script from a token list.
    #[must_use]
    pub fn new(tokens: Vec<DeltaToken>) -> Self {
        let total_bytes = tokens.iter().map(DeltaToken::byte_len).sum();
        let literal_bytes = tokens
            .iter()
            .filter(|token| token.is_literal())
            .map(DeltaToken::byte_len)
            .sum();
        Self {
            tokens,
            total_bytes,
            literal_bytes,
        }
    }

    /// Parses a complete serialized delta.
    ///
    /// Bytes after the END command are ignored.
    ///
    /// # Errors
    ///
    /// Fails with [`JobError::MalformedDelta`] when the stream is corrupt or
    /// ends before its END command.
    pub fn parse(mut delta: &[u8]) -> Result<Self, JobError> {
        let header = take(&mut delta, MAGIC_LEN)?;
        let mut magic = [0u8; MAGIC_LEN];
        magic.copy_from_slice(header);
        wire::check_magic(&magic)?;

        let mut tokens = Vec::new();
        loop {
            let tag = take(&mut delta, 1)?[0];
            let params = take(&mut delta, wire::params_len(tag)?)?;
            match wire::decode_command(tag, params)? {
                Command::End => return Ok(Self::new(tokens)),
                Command::Literal { len } => {
                    let len = usize::try_from(len)
                        .map_err(|_| JobError::malformed_delta("literal length overflow"))?;
                    tokens.push(DeltaToken::Literal(take(&mut delta, len)?.to_vec()));
                }
                Command::Copy { offset, len } => tokens.push(DeltaToken::Copy { offset, len }),
            }
        }
    }

    /// Serializes the script, splitting long literals and appending END.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        wire::encode_magic(&mut out);
        for token in &self.tokens {
            match token {
                DeltaToken::Literal(bytes) => {
                    for chunk in bytes.chunks(wire::MAX_LITERAL_LEN) {
                        wire::encode_literal(chunk, &mut out);
                    }
                }
                DeltaToken::Copy { offset, len } => wire::encode_copy(*offset, *len, &mut out),
            }
        }
        wire::encode_end(&mut out);
        out
    }

    /// Returns the token list.
    #[must_use]
    pub fn tokens(&self) -> &[DeltaToken] {
        &self.tokens
    }

    /// Consumes the script and returns its token list.
    #[must_use]
    pub fn into_tokens(self) -> Vec<DeltaToken> {
        self.tokens
    }

    /// Returns the number of target bytes the script describes.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Returns the number of bytes carried as literals.
    #[must_use]
    pub const fn literal_bytes(&self) -> u64 {
        self.literal_bytes
    }

    /// Returns the number of bytes copied from the basis.
    #[must_use]
    pub const fn copy_bytes(&self) -> u64 {
        self.total_bytes - self.literal_bytes
    }

    /// Returns the number of copy tokens.
    #[must_use]
    pub fn copy_count(&self) -> usize {
        self.tokens.iter().filter(|token| !token.is_literal()).count()
    }

    /// Returns `true` when the script describes an empty target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rebuilds the target from `basis`.
    ///
    /// # Errors
    ///
    /// Fails with [`JobError::TruncatedBasis`] when a copy reaches past the
    /// end of `basis`.
    pub fn apply_to(&self, basis: &[u8]) -> Result<Vec<u8>, JobError> {
        let mut target = Vec::with_capacity(usize::try_from(self.total_bytes).unwrap_or(0));
        for token in &self.tokens {
            match token {
                DeltaToken::Literal(bytes) => target.extend_from_slice(bytes),
                DeltaToken::Copy { offset, len } => {
                    let available = (basis.len() as u64).saturating_sub(*offset);
                    if available < *len {
                        return Err(JobError::TruncatedBasis {
                            offset: offset + available,
                            missing: len - available,
                        });
                    }
                    // Both fit in the basis length, which is a usize.
                    let start = *offset as usize;
                    target.extend_from_slice(&basis[start..start + *len as usize]);
                }
            }
        }
        Ok(target)
    }
}

fn take<'a>(data: &mut &'a [u8], len: usize) -> Result<&'a [u8], JobError> {
    if data.len() < len {
        return Err(JobError::malformed_delta(format!(
            "delta truncated: needed {len} bytes, {} left",
            data.len()
        )));
    }
    let (head, tail) = data.split_at(len);
    *data = tail;
    Ok(head)
}
