// Field-tagged primitive decoding.
//
// Each decoder takes the bytes at the current cursor plus the name of the
// field being read, and returns `(value, bytes_consumed)`. Failures carry
// the field name and the expected type so callers can report
// "decoding node.key: ..." without any extra bookkeeping.

use super::varint::{self, VarIntError};

// ---------------------------------------------------------------------------
// Decode error
// ---------------------------------------------------------------------------

/// Error produced when a field cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Input ended before the field was complete.
    #[error("decoding {field}: truncated input (expected {expected})")]
    Truncated {
        field: &'static str,
        expected: &'static str,
    },
    /// The encoded value does not fit the target integer width.
    #[error("decoding {field}: {expected} overflows its target width")]
    Overflow {
        field: &'static str,
        expected: &'static str,
    },
    /// The bytes are present but do not form a valid encoding.
    #[error("decoding {field}: invalid {expected}: {reason}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
        reason: String,
    },
}

impl DecodeError {
    /// Name of the field that failed to decode.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Truncated { field, .. }
            | Self::Overflow { field, .. }
            | Self::Invalid { field, .. } => *field,
        }
    }

    /// Name of the type the decoder expected at that field.
    pub fn expected(&self) -> &'static str {
        match self {
            Self::Truncated { expected, .. }
            | Self::Overflow { expected, .. }
            | Self::Invalid { expected, .. } => *expected,
        }
    }

    pub(crate) fn from_varint(
        e: VarIntError,
        field: &'static str,
        expected: &'static str,
    ) -> Self {
        match e {
            VarIntError::Underflow => Self::Truncated { field, expected },
            VarIntError::Overflow => Self::Overflow { field, expected },
        }
    }
}

// ---------------------------------------------------------------------------
// Slice decoders
// ---------------------------------------------------------------------------

pub const INT8: &str = "int8";
pub const VARINT: &str = "varint";
pub const UVARINT: &str = "uvarint";
pub const BYTE_SLICE: &str = "byte slice";

/// Read exactly one byte, reinterpreted as a signed 8-bit integer.
pub fn decode_int8(buf: &[u8], field: &'static str) -> Result<(i8, usize), DecodeError> {
    match buf.first() {
        Some(&b) => Ok((b as i8, 1)),
        None => Err(DecodeError::Truncated {
            field,
            expected: INT8,
        }),
    }
}

/// Read a non-negative varint that must fit an `i64`.
pub fn decode_varint(buf: &[u8], field: &'static str) -> Result<(i64, usize), DecodeError> {
    varint::read_i64(buf).map_err(|e| DecodeError::from_varint(e, field, VARINT))
}

/// Read a varint as a full-width `u64`.
pub fn decode_uvarint(buf: &[u8], field: &'static str) -> Result<(u64, usize), DecodeError> {
    varint::read_u64(buf).map_err(|e| DecodeError::from_varint(e, field, UVARINT))
}

/// Read a varint length `L` followed by exactly `L` payload bytes.
///
/// The returned slice borrows from `buf`; the consumed count covers both the
/// prefix and the payload.
pub fn decode_byte_slice<'a>(
    buf: &'a [u8],
    field: &'static str,
) -> Result<(&'a [u8], usize), DecodeError> {
    let (len, n) =
        varint::read_usize(buf).map_err(|e| DecodeError::from_varint(e, field, BYTE_SLICE))?;
    let rest = &buf[n..];
    if rest.len() < len {
        return Err(DecodeError::Truncated {
            field,
            expected: BYTE_SLICE,
        });
    }
    Ok((&rest[..len], n + len))
}

/// Append the length-prefixed form of `data` to `out`.
pub fn encode_byte_slice(out: &mut Vec<u8>, data: &[u8]) {
    varint::write_u64(out, data.len() as u64);
    out.extend_from_slice(data);
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Sequential cursor over a borrowed buffer.
///
/// Wraps the slice decoders above and advances past whatever each one
/// consumed. A failed read leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn int8(&mut self, field: &'static str) -> Result<i8, DecodeError> {
        let (v, n) = decode_int8(self.remaining(), field)?;
        self.pos += n;
        Ok(v)
    }

    pub fn varint(&mut self, field: &'static str) -> Result<i64, DecodeError> {
        let (v, n) = decode_varint(self.remaining(), field)?;
        self.pos += n;
        Ok(v)
    }

    pub fn uvarint(&mut self, field: &'static str) -> Result<u64, DecodeError> {
        let (v, n) = decode_uvarint(self.remaining(), field)?;
        self.pos += n;
        Ok(v)
    }

    pub fn byte_slice(&mut self, field: &'static str) -> Result<&'a [u8], DecodeError> {
        let (v, n) = decode_byte_slice(self.remaining(), field)?;
        self.pos += n;
        Ok(v)
    }

    /// Take exactly `len` raw bytes.
    pub fn take(
        &mut self,
        len: usize,
        field: &'static str,
        expected: &'static str,
    ) -> Result<&'a [u8], DecodeError> {
        let rest = self.remaining();
        if rest.len() < len {
            return Err(DecodeError::Truncated { field, expected });
        }
        self.pos += len;
        Ok(&rest[..len])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
