// Note event types
// The data contract between pattern sources, the scheduler, and the encoder

use serde::{Deserialize, Serialize};

use super::kit::{DrumMap, DrumPiece, PERCUSSION_CHANNEL};

/// A symbolic note produced by a pattern source
///
/// Times are in beats (quarter notes) from the start of the song. Pitch and
/// velocity are kept as wide integers so that out-of-range values survive
/// until the scheduler clamps them and records a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pitch: i32,
    start_beat: f64,
    duration_beat: f64,
    velocity: i32,
    channel: u8,
    #[serde(default)]
    is_percussion: bool,
}

impl NoteEvent {
    /// Create a melodic note event
    pub fn new(pitch: i32, start_beat: f64, duration_beat: f64, velocity: i32, channel: u8) -> Self {
        NoteEvent {
            pitch,
            start_beat,
            duration_beat,
            velocity,
            channel,
            is_percussion: false,
        }
    }

    /// Create a percussion hit; the scheduler routes it to the percussion channel
    pub fn percussion(pitch: i32, start_beat: f64, duration_beat: f64, velocity: i32) -> Self {
        NoteEvent {
            pitch,
            start_beat,
            duration_beat,
            velocity,
            channel: PERCUSSION_CHANNEL,
            is_percussion: true,
        }
    }

    /// Create a percussion hit for a named drum piece
    pub fn drum(
        piece: DrumPiece,
        drum_map: &DrumMap,
        start_beat: f64,
        duration_beat: f64,
        velocity: i32,
    ) -> Self {
        NoteEvent::percussion(drum_map.note(piece) as i32, start_beat, duration_beat, velocity)
    }

    /// Parse a JSON array of note events as produced by external pattern sources
    pub fn list_from_json(json: &str) -> Result<Vec<NoteEvent>, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn pitch(&self) -> i32 {
        self.pitch
    }

    pub fn start_beat(&self) -> f64 {
        self.start_beat
    }

    pub fn duration_beat(&self) -> f64 {
        self.duration_beat
    }

    pub fn velocity(&self) -> i32 {
        self.velocity
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn is_percussion(&self) -> bool {
        self.is_percussion
    }

    /// Copy of this event moved later by `offset_beats`
    pub(crate) fn shifted(&self, offset_beats: f64) -> NoteEvent {
        NoteEvent {
            start_beat: self.start_beat + offset_beats,
            ..self.clone()
        }
    }
}

/// A note after quantization, positioned in ticks
///
/// Only the scheduler creates these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduledEvent {
    channel: u8,
    start_tick: u32,
    duration_tick: u32,
    pitch: u8,
    velocity: u8,
}

impl ScheduledEvent {
    pub(crate) fn new(channel: u8, start_tick: u32, duration_tick: u32, pitch: u8, velocity: u8) -> Self {
        ScheduledEvent {
            channel,
            start_tick,
            duration_tick,
            pitch,
            velocity,
        }
    }

    /// MIDI channel (0-15)
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Absolute start position in ticks
    pub fn start_tick(&self) -> u32 {
        self.start_tick
    }

    /// Length in ticks, always at least 1
    pub fn duration_tick(&self) -> u32 {
        self.duration_tick
    }

    /// Absolute tick at which the note is released
    pub fn end_tick(&self) -> u32 {
        self.start_tick + self.duration_tick
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_event_creation() {
        let event = NoteEvent::new(60, 1.5, 0.5, 100, 2);

        assert_eq!(event.pitch(), 60);
        assert_eq!(event.start_beat(), 1.5);
        assert_eq!(event.duration_beat(), 0.5);
        assert_eq!(event.velocity(), 100);
        assert_eq!(event.channel(), 2);
        assert!(!event.is_percussion());
    }

    #[test]
    fn test_drum_event_uses_map() {
        let drum_map = DrumMap::default();
        let event = NoteEvent::drum(DrumPiece::Snare, &drum_map, 1.0, 0.25, 90);

        assert_eq!(event.pitch(), 38);
        assert_eq!(event.channel(), 9);
        assert!(event.is_percussion());
    }

    #[test]
    fn test_shifted_keeps_everything_but_start() {
        let event = NoteEvent::new(64, 1.0, 2.0, 80, 1);
        let shifted = event.shifted(4.0);

        assert_eq!(shifted.start_beat(), 5.0);
        assert_eq!(shifted.duration_beat(), 2.0);
        assert_eq!(shifted.pitch(), 64);
        assert_eq!(shifted.channel(), 1);
    }

    #[test]
    fn test_list_from_json() {
        let json = r#"[
            {"pitch": 60, "start_beat": 0.0, "duration_beat": 1.0, "velocity": 100, "channel": 0},
            {"pitch": 36, "start_beat": 0.0, "duration_beat": 0.25, "velocity": 110, "channel": 9, "is_percussion": true}
        ]"#;

        let events = NoteEvent::list_from_json(json).unwrap();
        assert_eq!(events.len(), 2);
        assert!(!events[0].is_percussion());
        assert!(events[1].is_percussion());
    }

    #[test]
    fn test_list_from_json_rejects_bad_channel() {
        let json = r#"[{"pitch": 60, "start_beat": 0.0, "duration_beat": 1.0, "velocity": 100, "channel": -1}]"#;
        assert!(NoteEvent::list_from_json(json).is_err());
    }

    #[test]
    fn test_scheduled_event_end_tick() {
        let event = ScheduledEvent::new(0, 480, 240, 60, 100);
        assert_eq!(event.end_tick(), 720);
    }
}
