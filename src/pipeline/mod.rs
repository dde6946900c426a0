// Pipeline - End-to-end rendering and import
// Schedules event sources into a song, encodes it, and stores the file with its hex dump

use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::arranger::{encode, Song, SongError};
use crate::config::{ConfigError, SequencerConfig};
use crate::events::EventSource;
use crate::groove::{ScheduleWarning, Scheduler};
use crate::import::{hex_dump, import_hex, ImportError, PayloadKind};
use crate::storage::{self, StorageError, StoredArtifact};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Song(#[from] SongError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// An encoded song held in memory
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    /// Complete MIDI file
    #[serde(skip)]
    pub bytes: Vec<u8>,

    pub track_count: usize,
    pub note_count: usize,

    /// Recovered per-event problems (clamped or dropped events)
    pub warnings: Vec<ScheduleWarning>,
}

/// A rendered song written to disk
#[derive(Debug, Clone, Serialize)]
pub struct RenderedFile {
    pub midi: StoredArtifact,
    pub hex_dump: StoredArtifact,
    pub track_count: usize,
    pub note_count: usize,
    pub warnings: Vec<ScheduleWarning>,
}

/// An imported hex payload written to disk
#[derive(Debug, Clone, Serialize)]
pub struct ImportedArtifact {
    pub kind: PayloadKind,
    pub midi: StoredArtifact,
    pub hex_dump: StoredArtifact,
}

/// Schedule and encode event sources into MIDI bytes
///
/// Sources are merged in order. Per-event problems never stop the render;
/// they come back as warnings.
pub fn render(sources: &[&dyn EventSource], config: &SequencerConfig) -> Result<RenderOutput, PipelineError> {
    config.validate()?;

    let report = Scheduler::new(config).schedule_sources(sources);
    if report.dropped_count() > 0 {
        log::warn!("Dropped {} note events while scheduling", report.dropped_count());
    }

    let note_count = report.events.len();
    let song = Song::from_schedule(config, report.events)?;
    let track_count = song.tracks().len().max(1);
    let bytes = encode(song);

    log::info!(
        "Rendered {} notes from {} sources into {} tracks ({} bytes)",
        note_count,
        sources.len(),
        track_count,
        bytes.len()
    );

    Ok(RenderOutput {
        bytes,
        track_count,
        note_count,
        warnings: report.warnings,
    })
}

/// Render event sources and write the MIDI file plus its `<stem>_hex.txt` dump
pub fn render_to_file(
    sources: &[&dyn EventSource],
    config: &SequencerConfig,
    path: &Path,
) -> Result<RenderedFile, PipelineError> {
    let output = render(sources, config)?;

    let midi = storage::store_bytes(path, &output.bytes)?;
    let dump = storage::store_hex_dump(path, &hex_dump(&output.bytes))?;

    Ok(RenderedFile {
        midi,
        hex_dump: dump,
        track_count: output.track_count,
        note_count: output.note_count,
        warnings: output.warnings,
    })
}

/// Repair hex text into a MIDI file and write it plus its hex dump
///
/// Malformed input fails before anything touches the disk.
pub fn import_to_file(text: &str, path: &Path) -> Result<ImportedArtifact, PipelineError> {
    let imported = import_hex(text)?;

    let midi = storage::store_bytes(path, &imported.bytes)?;
    let dump = storage::store_hex_dump(path, &imported.hex_dump)?;

    Ok(ImportedArtifact {
        kind: imported.kind,
        midi,
        hex_dump: dump,
    })
}

/// Read a hex text file and import it with [`import_to_file`]
pub fn import_file(input: &Path, output: &Path) -> Result<ImportedArtifact, PipelineError> {
    let text = storage::read_text(input)?;
    import_to_file(&text, output)
}
