// Instrument kit - General MIDI drum notes and instrument programs
// Replaces hard-coded lookup tables with values that travel in the config

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Channel 10 (0-indexed = 9) is reserved for percussion by General MIDI
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Drum kit pieces with General MIDI note assignments
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrumPiece {
    Kick,
    Snare,
    ClosedHihat,
    OpenHihat,
    LowTom,
    MidTom,
    HighTom,
    Crash,
    Ride,
    Clap,
    Rim,
    Cowbell,
}

impl DrumPiece {
    /// General MIDI note number for this piece
    pub fn general_midi_note(&self) -> u8 {
        match self {
            DrumPiece::Kick => 36,        // C1 - Bass Drum 1
            DrumPiece::Snare => 38,       // D1 - Acoustic Snare
            DrumPiece::ClosedHihat => 42, // F#1
            DrumPiece::OpenHihat => 46,   // A#1
            DrumPiece::LowTom => 45,      // A1
            DrumPiece::MidTom => 47,      // B1
            DrumPiece::HighTom => 50,     // D2
            DrumPiece::Crash => 49,       // C#2 - Crash Cymbal 1
            DrumPiece::Ride => 51,        // D#2 - Ride Cymbal 1
            DrumPiece::Clap => 39,        // D#1
            DrumPiece::Rim => 37,         // C#1 - Side Stick
            DrumPiece::Cowbell => 56,     // G#2
        }
    }

    /// Resolve a pattern-table drum name; unknown names fall back to the kick
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "kick" => DrumPiece::Kick,
            "snare" => DrumPiece::Snare,
            "hihat" | "closed_hihat" => DrumPiece::ClosedHihat,
            "hihat_open" | "open_hihat" => DrumPiece::OpenHihat,
            "tom1" | "low_tom" => DrumPiece::LowTom,
            "tom2" | "mid_tom" => DrumPiece::MidTom,
            "tom3" | "high_tom" => DrumPiece::HighTom,
            "crash" => DrumPiece::Crash,
            "ride" => DrumPiece::Ride,
            "clap" => DrumPiece::Clap,
            "rim" => DrumPiece::Rim,
            "cowbell" => DrumPiece::Cowbell,
            _ => DrumPiece::Kick,
        }
    }
}

/// Drum piece to note number table
///
/// Only overrides are stored; every other piece uses its General MIDI note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrumMap {
    overrides: BTreeMap<DrumPiece, u8>,
}

impl DrumMap {
    /// Map a piece to a different note number (clamped to 0-127)
    pub fn with_override(mut self, piece: DrumPiece, note: u8) -> Self {
        self.overrides.insert(piece, note.min(127));
        self
    }

    /// Note number for a piece
    pub fn note(&self, piece: DrumPiece) -> u8 {
        self.overrides
            .get(&piece)
            .copied()
            .unwrap_or_else(|| piece.general_midi_note())
            .min(127)
    }
}

/// Instruments a pattern source can voice a channel with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Piano,
    Guitar,
    Bass,
    Drums,
}

impl Instrument {
    /// General MIDI program, `None` for drums (the percussion channel ignores programs)
    pub fn program(&self) -> Option<u8> {
        match self {
            Instrument::Piano => Some(0),   // Acoustic Grand Piano
            Instrument::Guitar => Some(24), // Acoustic Guitar (nylon)
            Instrument::Bass => Some(32),   // Acoustic Bass
            Instrument::Drums => None,
        }
    }

    /// Name written into the track name meta event
    pub fn display_name(&self) -> &'static str {
        match self {
            Instrument::Piano => "Piano",
            Instrument::Guitar => "Guitar",
            Instrument::Bass => "Bass",
            Instrument::Drums => "Drums",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_midi_notes() {
        assert_eq!(DrumPiece::Kick.general_midi_note(), 36);
        assert_eq!(DrumPiece::Snare.general_midi_note(), 38);
        assert_eq!(DrumPiece::ClosedHihat.general_midi_note(), 42);
        assert_eq!(DrumPiece::Cowbell.general_midi_note(), 56);
    }

    #[test]
    fn test_from_name_with_fallback() {
        assert_eq!(DrumPiece::from_name("snare"), DrumPiece::Snare);
        assert_eq!(DrumPiece::from_name("HiHat_Open"), DrumPiece::OpenHihat);
        assert_eq!(DrumPiece::from_name("tom3"), DrumPiece::HighTom);
        assert_eq!(DrumPiece::from_name("gong"), DrumPiece::Kick);
    }

    #[test]
    fn test_drum_map_overrides() {
        let drum_map = DrumMap::default().with_override(DrumPiece::Snare, 40);

        assert_eq!(drum_map.note(DrumPiece::Snare), 40);
        assert_eq!(drum_map.note(DrumPiece::Kick), 36);

        let clamped = DrumMap::default().with_override(DrumPiece::Ride, 200);
        assert_eq!(clamped.note(DrumPiece::Ride), 127);
    }

    #[test]
    fn test_drum_map_from_json() {
        let drum_map: DrumMap = serde_json::from_str(r#"{"clap": 40}"#).unwrap();
        assert_eq!(drum_map.note(DrumPiece::Clap), 40);
        assert_eq!(drum_map.note(DrumPiece::Rim), 37);
    }

    #[test]
    fn test_instrument_programs() {
        assert_eq!(Instrument::Piano.program(), Some(0));
        assert_eq!(Instrument::Guitar.program(), Some(24));
        assert_eq!(Instrument::Bass.program(), Some(32));
        assert_eq!(Instrument::Drums.program(), None);
        assert_eq!(Instrument::Bass.display_name(), "Bass");
    }
}
