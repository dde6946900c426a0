// Note events module
// Note event contract, event sources, and the instrument kit tables

pub mod kit;
pub mod source;
pub mod types;

pub use kit::{DrumMap, DrumPiece, Instrument, PERCUSSION_CHANNEL};
pub use source::{EventSource, Pattern};
pub use types::{NoteEvent, ScheduledEvent};
