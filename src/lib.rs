// Songsmith - Note events to Standard MIDI Files
// Module declarations

pub mod arranger;
pub mod config;
pub mod events;
pub mod groove;
pub mod import;
pub mod pipeline;
pub mod storage;

pub use arranger::{encode, inspect, Song, SmfSummary, Track};
pub use config::{ConfigError, SequencerConfig};
pub use events::{DrumPiece, EventSource, Instrument, NoteEvent, Pattern, ScheduledEvent};
pub use groove::{GridDivision, ScheduleReport, ScheduleWarning, Scheduler, TimeSignature};
pub use import::{hex_dump, import_hex, ImportError, ImportedFile, PayloadKind};
pub use pipeline::{import_file, import_to_file, render, render_to_file, PipelineError};
pub use storage::{StorageError, StoredArtifact};
