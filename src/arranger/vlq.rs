// Variable-length quantities - the delta-time encoding used inside track chunks
// 7 bits per byte, most significant group first, high bit set on every byte but the last

use thiserror::Error;

/// Largest value a 4-byte VLQ can hold (28 bits)
pub const MAX_VLQ: u32 = 0x0FFF_FFFF;

/// Longest legal encoding in bytes
pub const MAX_VLQ_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VlqError {
    #[error("Variable-length quantity ends before its last byte")]
    Truncated,

    #[error("Variable-length quantity is longer than 4 bytes")]
    TooLong,
}

/// Append the minimal VLQ encoding of `value` to `buffer`
///
/// Values above [`MAX_VLQ`] cannot be represented and are saturated to it.
/// Zero encodes as the single byte `0x00`.
pub fn write_vlq(value: u32, buffer: &mut Vec<u8>) {
    let value = if value > MAX_VLQ {
        log::warn!("Delta {} exceeds the VLQ range, saturating", value);
        MAX_VLQ
    } else {
        value
    };

    // Find the most significant non-empty 7-bit group
    let mut shift = 0;
    while shift < 21 && value >> (shift + 7) != 0 {
        shift += 7;
    }

    while shift > 0 {
        buffer.push(((value >> shift) & 0x7F) as u8 | 0x80);
        shift -= 7;
    }
    buffer.push((value & 0x7F) as u8);
}

/// Encode `value` as a standalone VLQ
pub fn encode_vlq(value: u32) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(MAX_VLQ_LEN);
    write_vlq(value, &mut buffer);
    buffer
}

/// Decode a VLQ from the start of `bytes`
///
/// Returns the value and the number of bytes consumed.
pub fn decode_vlq(bytes: &[u8]) -> Result<(u32, usize), VlqError> {
    let mut value = 0u32;

    for (i, &byte) in bytes.iter().enumerate() {
        if i == MAX_VLQ_LEN {
            return Err(VlqError::TooLong);
        }

        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    if bytes.len() >= MAX_VLQ_LEN {
        Err(VlqError::TooLong)
    } else {
        Err(VlqError::Truncated)
    }
}
