//! crates/match/src/wire.rs
//!
//! Delta command encoding.
//!
//! A delta stream is the big-endian magic number followed by commands. Each
//! command starts with a one-byte tag:
//!
//! | tag | command | parameters |
//! |---|---|---|
//! | `0x00` | END | none |
//! | `0x01..=0x04` | LITERAL | length in 1, 2, 4 or 8 bytes, then the payload |
//! | `0x10 \| ow << 2 \| lw` | COPY | offset in `1 << ow` bytes, then length in `1 << lw` bytes |
//!
//! Parameters are big-endian and written in the narrowest width that holds
//! them.

use streaming::JobError;

/// Magic number opening every delta stream.
pub const DELTA_MAGIC: u32 = 0x7273_0236;

/// Length of the delta stream header.
pub const MAGIC_LEN: usize = 4;

/// Largest literal payload the encoder writes in one command, unless the
/// block length is larger; runs shorter than one block are never split.
pub const MAX_LITERAL_LEN: usize = 64 * 1024;

/// Longest encoded parameter block (an 8-byte offset and an 8-byte length).
pub const MAX_PARAMS_LEN: usize = 16;

const TAG_END: u8 = 0x00;
const TAG_LITERAL_BASE: u8 = 0x01;
const TAG_COPY_BASE: u8 = 0x10;

/// Decoded delta command header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    /// End of the delta stream.
    End,
    /// `len` literal bytes follow.
    Literal {
        /// Payload length.
        len: u64,
    },
    /// Copy `len` bytes from the basis starting at `offset`.
    Copy {
        /// Basis offset.
        offset: u64,
        /// Number of bytes.
        len: u64,
    },
}

/// Width code (0..=3) of the narrowest big-endian field holding `value`.
const fn width_code(value: u64) -> u8 {
    if value <= 0xff {
        0
    } else if value <= 0xffff {
        1
    } else if value <= 0xffff_ffff {
        2
    } else {
        3
    }
}

fn push_field(value: u64, code: u8, out: &mut Vec<u8>) {
    let width = 1usize << code;
    out.extend_from_slice(&value.to_be_bytes()[8 - width..]);
}

fn read_field(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |value, &byte| (value << 8) | u64::from(byte))
}

/// Appends the stream header.
pub fn encode_magic(out: &mut Vec<u8>) {
    out.extend_from_slice(&DELTA_MAGIC.to_be_bytes());
}

/// Checks a stream header.
pub fn check_magic(header: &[u8; MAGIC_LEN]) -> Result<(), JobError> {
    let magic = u32::from_be_bytes(*header);
    if magic == DELTA_MAGIC {
        Ok(())
    } else {
        Err(JobError::malformed_delta(format!(
            "bad delta magic {magic:#010x}"
        )))
    }
}

/// Appends the END command.
pub fn encode_end(out: &mut Vec<u8>) {
    out.push(TAG_END);
}

/// Appends a LITERAL command header for a payload of `len` bytes.
///
/// The caller appends the payload itself.
pub fn encode_literal_header(len: u64, out: &mut Vec<u8>) {
    let code = width_code(len);
    out.push(TAG_LITERAL_BASE + code);
    push_field(len, code, out);
}

/// Appends a complete LITERAL command.
pub fn encode_literal(payload: &[u8], out: &mut Vec<u8>) {
    encode_literal_header(payload.len() as u64, out);
    out.extend_from_slice(payload);
}

/// Appends a COPY command.
pub fn encode_copy(offset: u64, len: u64, out: &mut Vec<u8>) {
    let offset_code = width_code(offset);
    let len_code = width_code(len);
    out.push(TAG_COPY_BASE | (offset_code << 2) | len_code);
    push_field(offset, offset_code, out);
    push_field(len, len_code, out);
}

/// Number of parameter bytes following `tag`.
///
/// Fails with [`JobError::MalformedDelta`] for unknown tags.
pub fn params_len(tag: u8) -> Result<usize, JobError> {
    match tag {
        TAG_END => Ok(0),
        0x01..=0x04 => Ok(1 << (tag - TAG_LITERAL_BASE)),
        0x10..=0x1f => {
            let offset_width = 1usize << ((tag >> 2) & 0x3);
            let len_width = 1usize << (tag & 0x3);
            Ok(offset_width + len_width)
        }
        _ => Err(JobError::malformed_delta(format!(
            "unknown delta command {tag:#04x}"
        ))),
    }
}

/// Decodes a command from its tag and exactly [`params_len`] parameter bytes.
///
/// Rejects zero-length commands, offsets beyond `i64::MAX` and copies whose
/// end overflows.
pub fn decode_command(tag: u8, params: &[u8]) -> Result<Command, JobError> {
    match tag {
        TAG_END => Ok(Command::End),
        0x01..=0x04 => {
            let len = read_field(params);
            if len == 0 {
                return Err(JobError::malformed_delta("zero-length literal"));
            }
            Ok(Command::Literal { len })
        }
        0x10..=0x1f => {
            let offset_width = 1usize << ((tag >> 2) & 0x3);
            let offset = read_field(&params[..offset_width]);
            let len = read_field(&params[offset_width..]);
            if len == 0 {
                return Err(JobError::malformed_delta(format!(
                    "zero-length copy at offset {offset}"
                )));
            }
            let end = offset.checked_add(len);
            if offset > i64::MAX as u64 || end.is_none_or(|end| end > i64::MAX as u64) {
                return Err(JobError::malformed_delta(format!(
                    "copy of {len} bytes at offset {offset} is out of range"
                )));
            }
            Ok(Command::Copy { offset, len })
        }
        _ => Err(JobError::malformed_delta(format!(
            "unknown delta command {tag:#04x}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Result<Command, JobError> {
        let need = params_len(bytes[0])?;
        assert_eq!(bytes.len(), 1 + need, "command length");
        decode_command(bytes[0], &bytes[1..])
    }

    #[test]
    fn widths_are_minimal() {
        assert_eq!(width_code(0), 0);
        assert_eq!(width_code(255), 0);
        assert_eq!(width_code(256), 1);
        assert_eq!(width_code(65_536), 2);
        assert_eq!(width_code(1 << 32), 3);
    }

    #[test]
    fn literal_header_layout() {
        let mut out = Vec::new();
        encode_literal(b"hello", &mut out);
        assert_eq!(out, [0x01, 5, b'h', b'e', b'l', b'l', b'o']);

        out.clear();
        encode_literal_header(300, &mut out);
        assert_eq!(out, [0x02, 0x01, 0x2c]);
    }

    #[test]
    fn copy_layout() {
        let mut out = Vec::new();
        encode_copy(510, 490, &mut out);
        assert_eq!(out, [0x15, 0x01, 0xfe, 0x01, 0xea]);
        assert_eq!(decode(&out).expect("copy"), Command::Copy { offset: 510, len: 490 });

        out.clear();
        encode_copy(0, 10, &mut out);
        assert_eq!(out, [0x10, 0, 10]);
    }

    #[test]
    fn wide_copy_decodes() {
        let mut out = Vec::new();
        encode_copy(1 << 40, 70_000, &mut out);
        assert_eq!(out[0], 0x10 | (3 << 2) | 2);
        assert_eq!(
            decode(&out).expect("copy"),
            Command::Copy {
                offset: 1 << 40,
                len: 70_000
            }
        );
    }

    #[test]
    fn end_has_no_parameters() {
        assert_eq!(params_len(0).expect("end"), 0);
        assert_eq!(decode_command(0, &[]).expect("end"), Command::End);
    }

    #[test]
    fn unknown_tags_are_rejected() {
        for tag in [0x05u8, 0x0f, 0x20, 0xff] {
            assert!(matches!(params_len(tag), Err(JobError::MalformedDelta(_))));
            assert!(decode_command(tag, &[]).is_err());
        }
    }

    #[test]
    fn zero_lengths_are_rejected() {
        assert!(matches!(
            decode(&[0x01, 0]),
            Err(JobError::MalformedDelta(_))
        ));
        assert!(matches!(
            decode(&[0x10, 4, 0]),
            Err(JobError::MalformedDelta(_))
        ));
    }

    #[test]
    fn out_of_range_copies_are_rejected() {
        let mut out = Vec::new();
        encode_copy(u64::MAX, 1, &mut out);
        assert!(decode(&out).is_err());

        out.clear();
        encode_copy(i64::MAX as u64, 1, &mut out);
        assert!(decode(&out).is_err());

        out.clear();
        encode_copy(i64::MAX as u64 - 1, 1, &mut out);
        assert!(decode(&out).is_ok());
    }

    #[test]
    fn magic_is_checked() {
        let mut out = Vec::new();
        encode_magic(&mut out);
        let header: [u8; MAGIC_LEN] = out.as_slice().try_into().expect("four bytes");
        assert!(check_magic(&header).is_ok());
        assert!(check_magic(&[0x72, 0x73, 0x01, 0x36]).is_err());
    }
}
