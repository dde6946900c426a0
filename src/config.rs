// Sequencer configuration
// Tempo, meter, resolution, and instrument tables passed explicitly into the
// scheduler and the song builder

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::events::{DrumMap, Instrument, PERCUSSION_CHANNEL};
use crate::groove::{GridDivision, TimeSignature};

/// Largest resolution a metrical MIDI header can declare (top bit selects SMPTE)
pub const MAX_TICKS_PER_QUARTER: u16 = 0x7FFF;

/// Tempo range accepted from generators; anything else falls back to the default
pub const MIN_TEMPO_BPM: f64 = 20.0;
pub const MAX_TEMPO_BPM: f64 = 300.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ticks per quarter must be in 1..={max}, got {0}", max = MAX_TICKS_PER_QUARTER)]
    InvalidResolution(u16),

    #[error("Tempo must be a positive finite BPM, got {0}")]
    InvalidTempo(f64),

    #[error("Channel {0} is out of range (0-15)")]
    InvalidChannel(u8),
}

/// Everything the scheduler and song builder need besides the events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Beats per minute
    pub tempo_bpm: f64,

    /// Meter declared in the output file
    pub time_signature: TimeSignature,

    /// Pulses per quarter note (PPQ) - typically 480 or 960
    pub ticks_per_quarter: u16,

    /// Channel exempt from monophonic serialization
    pub percussion_channel: u8,

    /// Grid that start times and durations snap to
    pub grid: GridDivision,

    /// Rescale event times from `time_signature` to 4/4 before quantizing;
    /// the rendered song then declares 4/4
    pub normalize_meter: bool,

    /// Emit a track name meta event for each track
    pub track_names: bool,

    /// Instrument voicing each channel (program change + track name)
    pub instruments: BTreeMap<u8, Instrument>,

    /// Drum note overrides
    pub drum_map: DrumMap,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        SequencerConfig {
            tempo_bpm: 120.0,
            time_signature: TimeSignature::COMMON,
            ticks_per_quarter: 480,
            percussion_channel: PERCUSSION_CHANNEL,
            grid: GridDivision::Sixteenth,
            normalize_meter: false,
            track_names: false,
            instruments: BTreeMap::new(),
            drum_map: DrumMap::default(),
        }
    }
}

impl SequencerConfig {
    /// Parse and validate a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SequencerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Check the values a MIDI file cannot represent
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_quarter == 0 || self.ticks_per_quarter > MAX_TICKS_PER_QUARTER {
            return Err(ConfigError::InvalidResolution(self.ticks_per_quarter));
        }
        if !self.tempo_bpm.is_finite() || self.tempo_bpm <= 0.0 {
            return Err(ConfigError::InvalidTempo(self.tempo_bpm));
        }
        if self.percussion_channel > 15 {
            return Err(ConfigError::InvalidChannel(self.percussion_channel));
        }
        if let Some(&channel) = self.instruments.keys().find(|&&channel| channel > 15) {
            return Err(ConfigError::InvalidChannel(channel));
        }
        Ok(())
    }

    /// Assign an instrument to a channel
    pub fn with_instrument(mut self, channel: u8, instrument: Instrument) -> Self {
        self.instruments.insert(channel, instrument);
        self
    }

    /// Meter the rendered file declares
    pub fn output_time_signature(&self) -> TimeSignature {
        if self.normalize_meter {
            TimeSignature::COMMON
        } else {
            self.time_signature
        }
    }
}
