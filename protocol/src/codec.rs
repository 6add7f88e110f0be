//! # Binary Codec
//!
//! Low-level pieces of the Factom wire format:
//!
//! - `VarInt_F`, the big-endian base-128 integer encoding used for Factoid
//!   amounts. Seven data bits per byte, most significant group first, `0x80`
//!   set on every byte but the last. A `u64` with its top bit set needs ten
//!   groups, the first of which is the lone high bit, so those encodings
//!   always start with `0x81`.
//! - Fixed-width big-endian writes (the 6-byte millisecond timestamp, 2-byte
//!   length prefixes).
//! - [`ByteReader`], a bounds-checked cursor used by every `unmarshal_binary`.

use crate::config::TIMESTAMP_LENGTH;
use crate::error::{FactomError, Result};

/// Longest possible `VarInt_F` encoding of a `u64`.
pub const MAX_VARINT_LENGTH: usize = 10;

/// Encode `value` as `VarInt_F`.
///
/// ```
/// use factom_protocol::codec::encode_varint;
///
/// assert_eq!(encode_varint(130), vec![129, 2]);
/// assert_eq!(encode_varint(0), vec![0]);
/// ```
pub fn encode_varint(value: u64) -> Vec<u8> {
    if value == 0 {
        return vec![0x00];
    }

    let mut groups = Vec::with_capacity(MAX_VARINT_LENGTH);
    let mut rest = value;
    while rest != 0 {
        groups.push((rest & 0x7f) as u8);
        rest >>= 7;
    }
    groups.reverse();

    let last = groups.len() - 1;
    for group in &mut groups[..last] {
        *group |= 0x80;
    }
    groups
}

/// Append the `VarInt_F` encoding of `value` to `buf`.
pub fn write_varint(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&encode_varint(value));
}

/// Decode a `VarInt_F` from the front of `data`, returning the value and the
/// number of bytes consumed.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, byte) in data.iter().enumerate() {
        if i == MAX_VARINT_LENGTH {
            break;
        }
        if value > (u64::MAX >> 7) {
            return Err(FactomError::malformed("varint", "value overflows 64 bits"));
        }
        value = (value << 7) | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(FactomError::malformed("varint", "unterminated encoding"))
}

/// Append the low 48 bits of `millis` as a 6-byte big-endian integer.
pub fn write_timestamp(buf: &mut Vec<u8>, millis: u64) {
    let bytes = millis.to_be_bytes();
    buf.extend_from_slice(&bytes[8 - TIMESTAMP_LENGTH..]);
}

/// Append a 2-byte big-endian length prefix.
pub fn write_u16_len(buf: &mut Vec<u8>, len: usize, what: &'static str) -> Result<()> {
    let len = u16::try_from(len).map_err(|_| FactomError::SizeLimitExceeded {
        what,
        size: len,
        max: u16::MAX as usize,
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// Cursor over a byte slice that turns every overrun into a
/// [`FactomError::Malformed`] naming the structure being decoded.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    what: &'static str,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8], what: &'static str) -> Self {
        Self { data, pos: 0, what }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(FactomError::malformed(
                self.what,
                format!(
                    "needed {} bytes at offset {}, only {} left",
                    n,
                    self.pos,
                    self.remaining()
                ),
            ));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u16_be(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    pub fn timestamp(&mut self) -> Result<u64> {
        let mut bytes = [0u8; 8];
        bytes[8 - TIMESTAMP_LENGTH..].copy_from_slice(self.take(TIMESTAMP_LENGTH)?);
        Ok(u64::from_be_bytes(bytes))
    }

    pub fn varint(&mut self) -> Result<u64> {
        let (value, used) = decode_varint(&self.data[self.pos..]).map_err(|e| match e {
            FactomError::Malformed { reason, .. } => FactomError::malformed(self.what, reason),
            other => other,
        })?;
        self.pos += used;
        Ok(value)
    }

    /// Everything not yet consumed.
    pub fn rest(&mut self) -> &'a [u8] {
        let out = &self.data[self.pos..];
        self.pos = self.data.len();
        out
    }
}
