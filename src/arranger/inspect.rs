// MIDI Inspection - Verify container framing and summarize a MIDI file
// Walks the chunks directly, then hands the bytes to midly for a full event parse

use serde::Serialize;
use thiserror::Error;

use super::chunk::{read_chunks, ChunkError, HEADER_BODY_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectError {
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error("File does not start with an MThd header chunk")]
    MissingHeader,

    #[error("Header chunk body is {0} bytes, expected 6")]
    HeaderLength(usize),

    #[error("Header declares {declared} tracks but {found} track chunks follow")]
    TrackCountMismatch { declared: u16, found: usize },

    #[error("Format 0 file declares {0} tracks")]
    FormatTrackCount(u16),

    #[error("Track {0} does not end with an end-of-track event")]
    MissingEndOfTrack(usize),

    #[error("MIDI parse failed: {0}")]
    Parse(String),
}

/// Per-track statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackSummary {
    /// Declared (and verified) chunk body length
    pub length: usize,

    /// Total events including meta events
    pub event_count: usize,

    pub note_on_count: usize,
    pub note_off_count: usize,

    /// Absolute tick of the end-of-track event
    pub end_tick: u64,

    /// Track name meta event, if present
    pub name: Option<String>,

    /// First tempo meta event (microseconds per quarter)
    pub tempo: Option<u32>,
}

/// What a MIDI file declares and contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmfSummary {
    pub format: u16,
    pub track_count: u16,

    /// Metrical resolution; `None` for SMPTE timecode timing
    pub ticks_per_quarter: Option<u16>,

    pub tracks: Vec<TrackSummary>,
}

/// Check the container invariants of a MIDI file and summarize its tracks
pub fn inspect(bytes: &[u8]) -> Result<SmfSummary, InspectError> {
    let chunks = read_chunks(bytes)?;

    let header = chunks
        .first()
        .filter(|chunk| chunk.is_header())
        .ok_or(InspectError::MissingHeader)?;
    if header.body.len() != HEADER_BODY_LEN {
        return Err(InspectError::HeaderLength(header.body.len()));
    }

    let format = u16::from_be_bytes([header.body[0], header.body[1]]);
    let track_count = u16::from_be_bytes([header.body[2], header.body[3]]);
    let division = u16::from_be_bytes([header.body[4], header.body[5]]);

    // Unknown chunk types are legal and skipped
    let track_chunks: Vec<_> = chunks.iter().filter(|chunk| chunk.is_track()).collect();
    if track_chunks.len() != track_count as usize {
        return Err(InspectError::TrackCountMismatch {
            declared: track_count,
            found: track_chunks.len(),
        });
    }
    if format == 0 && track_count != 1 {
        return Err(InspectError::FormatTrackCount(track_count));
    }

    for (index, chunk) in track_chunks.iter().enumerate() {
        if !chunk.body.ends_with(&[0xFF, 0x2F, 0x00]) {
            return Err(InspectError::MissingEndOfTrack(index));
        }
    }

    let smf = midly::Smf::parse(bytes).map_err(|e| InspectError::Parse(e.to_string()))?;

    let tracks = smf
        .tracks
        .iter()
        .zip(&track_chunks)
        .map(|(events, chunk)| summarize_track(events, chunk.body.len()))
        .collect();

    log::debug!("Inspected MIDI file: format {}, {} tracks", format, track_count);

    Ok(SmfSummary {
        format,
        track_count,
        ticks_per_quarter: (division & 0x8000 == 0).then_some(division),
        tracks,
    })
}

fn summarize_track(events: &[midly::TrackEvent], length: usize) -> TrackSummary {
    use midly::{MetaMessage, MidiMessage, TrackEventKind};

    let mut summary = TrackSummary {
        length,
        event_count: events.len(),
        note_on_count: 0,
        note_off_count: 0,
        end_tick: 0,
        name: None,
        tempo: None,
    };

    let mut tick = 0u64;
    for event in events {
        tick += event.delta.as_int() as u64;

        match event.kind {
            TrackEventKind::Midi { message, .. } => match message {
                MidiMessage::NoteOn { vel, .. } if vel.as_int() > 0 => summary.note_on_count += 1,
                MidiMessage::NoteOn { .. } | MidiMessage::NoteOff { .. } => summary.note_off_count += 1,
                _ => {}
            },
            TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
                summary.name = Some(String::from_utf8_lossy(name).into_owned());
            }
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                if summary.tempo.is_none() {
                    summary.tempo = Some(tempo.as_int());
                }
            }
            TrackEventKind::Meta(MetaMessage::EndOfTrack) => summary.end_tick = tick,
            _ => {}
        }
    }

    summary
}
