// Chunk framing - header and track chunks of a Standard MIDI File
// Every chunk is a 4-byte type tag followed by a 4-byte big-endian body length

use thiserror::Error;

/// Type tag of the file header chunk
pub const HEADER_MAGIC: [u8; 4] = *b"MThd";

/// Type tag of a track chunk
pub const TRACK_MAGIC: [u8; 4] = *b"MTrk";

/// Size of the type tag plus length field
pub const CHUNK_PREFIX_LEN: usize = 8;

/// Header chunk body is always format + track count + division
pub const HEADER_BODY_LEN: usize = 6;

/// Full header chunk size including its prefix
pub const HEADER_CHUNK_LEN: usize = CHUNK_PREFIX_LEN + HEADER_BODY_LEN;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("Chunk prefix at byte {offset} is cut short")]
    TruncatedPrefix { offset: usize },

    #[error("Chunk at byte {offset} declares {declared} bytes but only {available} follow")]
    TruncatedBody {
        offset: usize,
        declared: usize,
        available: usize,
    },
}

/// A chunk located inside a byte buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Byte offset of the type tag
    pub offset: usize,

    /// Type tag (e.g., `MThd`, `MTrk`)
    pub kind: [u8; 4],

    /// Body bytes, exactly as long as the declared length
    pub body: &'a [u8],
}

impl Chunk<'_> {
    pub fn is_header(&self) -> bool {
        self.kind == HEADER_MAGIC
    }

    pub fn is_track(&self) -> bool {
        self.kind == TRACK_MAGIC
    }
}

/// Append a header chunk declaring metrical timing
pub fn write_header_chunk(buffer: &mut Vec<u8>, format: u16, track_count: u16, ticks_per_quarter: u16) {
    buffer.extend_from_slice(&HEADER_MAGIC);
    buffer.extend_from_slice(&(HEADER_BODY_LEN as u32).to_be_bytes());
    buffer.extend_from_slice(&format.to_be_bytes());
    buffer.extend_from_slice(&track_count.to_be_bytes());
    // Top bit clear selects ticks-per-quarter timing
    buffer.extend_from_slice(&(ticks_per_quarter & 0x7FFF).to_be_bytes());
}

/// Append a track chunk wrapping `payload`, with the length taken from the payload itself
pub fn write_track_chunk(buffer: &mut Vec<u8>, payload: &[u8]) {
    debug_assert!(payload.len() <= u32::MAX as usize);
    buffer.extend_from_slice(&TRACK_MAGIC);
    buffer.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buffer.extend_from_slice(payload);
}

/// Split a buffer into chunks, checking that every declared length fits
pub fn read_chunks(bytes: &[u8]) -> Result<Vec<Chunk<'_>>, ChunkError> {
    let mut chunks = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let prefix = bytes
            .get(offset..offset + CHUNK_PREFIX_LEN)
            .ok_or(ChunkError::TruncatedPrefix { offset })?;

        let kind = [prefix[0], prefix[1], prefix[2], prefix[3]];
        let declared = u32::from_be_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]) as usize;

        let body_start = offset + CHUNK_PREFIX_LEN;
        let available = bytes.len() - body_start;
        if declared > available {
            return Err(ChunkError::TruncatedBody {
                offset,
                declared,
                available,
            });
        }

        chunks.push(Chunk {
            offset,
            kind,
            body: &bytes[body_start..body_start + declared],
        });
        offset = body_start + declared;
    }

    Ok(chunks)
}
