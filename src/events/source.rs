// Event sources
// Pattern generators hand their notes to the scheduler through this seam

use serde::{Deserialize, Serialize};

use super::types::NoteEvent;

/// Anything that can produce note events for a song
///
/// Generators (chord strummers, drum machines, bass walkers) live outside this
/// crate and only need to implement this trait. Sources make no ordering
/// promise; the scheduler imposes one.
pub trait EventSource {
    /// Produce this source's events, in any order
    fn note_events(&self) -> Vec<NoteEvent>;

    /// Name used in log output
    fn source_name(&self) -> &str {
        "events"
    }
}

impl EventSource for Vec<NoteEvent> {
    fn note_events(&self) -> Vec<NoteEvent> {
        self.clone()
    }
}

/// A named block of events placed at an offset in the song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Pattern name (e.g., "verse_strum", "fill")
    pub name: String,

    /// Where the pattern starts, in beats
    pub offset_beats: f64,

    /// Events with start times relative to the pattern start
    pub events: Vec<NoteEvent>,
}

impl Pattern {
    /// Create a pattern starting at beat 0
    pub fn new(name: impl Into<String>, events: Vec<NoteEvent>) -> Self {
        Pattern {
            name: name.into(),
            offset_beats: 0.0,
            events,
        }
    }

    /// Move the pattern to start at `offset_beats`
    pub fn at(mut self, offset_beats: f64) -> Self {
        self.offset_beats = offset_beats;
        self
    }
}

impl EventSource for Pattern {
    fn note_events(&self) -> Vec<NoteEvent> {
        self.events
            .iter()
            .map(|event| event.shifted(self.offset_beats))
            .collect()
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
