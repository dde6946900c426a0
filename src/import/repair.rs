// Payload repair - Complete partial MIDI byte payloads into valid files
// Header-led payloads pass through; track chunks and raw events get the framing they lack

use serde::Serialize;

use super::dump::hex_dump;
use super::hex::{decode_hex_text, trim_zero_padding, ImportError};
use crate::arranger::chunk::{
    write_header_chunk, write_track_chunk, CHUNK_PREFIX_LEN, HEADER_CHUNK_LEN, HEADER_MAGIC,
    TRACK_MAGIC,
};

/// Resolution declared by synthesized headers
pub const REPAIR_TICKS_PER_QUARTER: u16 = 96;

/// What an imported payload turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// Starts with `MThd`; already a complete file
    File,

    /// Starts with `MTrk`; the file header is missing
    TrackChunk,

    /// Bare track events with no framing at all
    RawEvents,
}

/// Result of importing a hex payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedFile {
    pub kind: PayloadKind,

    /// Complete MIDI file bytes
    #[serde(skip)]
    pub bytes: Vec<u8>,

    /// Dump of `bytes` for the companion text file
    pub hex_dump: String,
}

/// Classify a payload by its leading magic
pub fn classify(payload: &[u8]) -> PayloadKind {
    if payload.starts_with(&HEADER_MAGIC) {
        PayloadKind::File
    } else if payload.starts_with(&TRACK_MAGIC) {
        PayloadKind::TrackChunk
    } else {
        PayloadKind::RawEvents
    }
}

/// Give a payload whatever framing it is missing
///
/// A track chunk's declared length is ignored and recomputed from the bytes
/// that actually follow its prefix.
pub fn repair(payload: &[u8]) -> (PayloadKind, Vec<u8>) {
    let kind = classify(payload);

    let bytes = match kind {
        PayloadKind::File => payload.to_vec(),
        PayloadKind::TrackChunk => single_track_file(&payload[CHUNK_PREFIX_LEN.min(payload.len())..]),
        PayloadKind::RawEvents => single_track_file(payload),
    };

    (kind, bytes)
}

fn single_track_file(events: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_CHUNK_LEN + CHUNK_PREFIX_LEN + events.len());
    write_header_chunk(&mut bytes, 0, 1, REPAIR_TICKS_PER_QUARTER);
    write_track_chunk(&mut bytes, events);
    bytes
}

/// Decode hex text and turn it into a complete MIDI file plus its dump
pub fn import_hex(text: &str) -> Result<ImportedFile, ImportError> {
    let decoded = decode_hex_text(text)?;
    let payload = trim_zero_padding(&decoded);
    if payload.is_empty() {
        return Err(ImportError::EmptyPayload);
    }

    if payload.len() != decoded.len() {
        log::debug!("Trimmed {} bytes of zero padding", decoded.len() - payload.len());
    }

    let (kind, bytes) = repair(payload);
    log::info!("Imported {:?} payload: {} bytes in, {} bytes out", kind, payload.len(), bytes.len());

    Ok(ImportedFile {
        kind,
        hex_dump: hex_dump(&bytes),
        bytes,
    })
}
