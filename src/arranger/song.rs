// Song model - Tracks of scheduled events plus tempo and meter
// Built once per generation run and consumed by the encoder

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::{SequencerConfig, MAX_TEMPO_BPM, MAX_TICKS_PER_QUARTER, MIN_TEMPO_BPM};
use crate::events::ScheduledEvent;
use crate::groove::TimeSignature;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SongError {
    #[error("Tempo must be a positive finite BPM, got {0}")]
    InvalidTempo(f64),

    #[error("Ticks per quarter must be in 1..={max}, got {0}", max = MAX_TICKS_PER_QUARTER)]
    InvalidResolution(u16),

    #[error("A MIDI file holds at most {max} tracks", max = u16::MAX)]
    TooManyTracks,

    #[error("Event on channel {event} pushed to the channel {track} track")]
    ChannelMismatch { track: u8, event: u8 },
}

/// One track chunk's worth of notes, all on a single channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    /// MIDI channel (0-15)
    pub channel: u8,

    /// Program change sent at tick 0
    pub program: Option<u8>,

    /// Track name meta event
    pub name: Option<String>,

    events: Vec<ScheduledEvent>,
}

impl Track {
    /// Create an empty track on a channel
    pub fn new(channel: u8) -> Self {
        Track {
            channel: channel.min(15),
            program: None,
            name: None,
            events: Vec::new(),
        }
    }

    pub fn with_program(mut self, program: u8) -> Self {
        self.program = Some(program.min(127));
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a scheduled event; events keep their insertion order
    ///
    /// The encoder writes every note on the track's channel, so events from
    /// another channel are rejected.
    pub fn push(&mut self, event: ScheduledEvent) -> Result<(), SongError> {
        if event.channel() != self.channel {
            return Err(SongError::ChannelMismatch {
                track: self.channel,
                event: event.channel(),
            });
        }
        self.events.push(event);
        Ok(())
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Everything needed to encode one MIDI file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Song {
    tempo_bpm: f64,
    time_signature: TimeSignature,
    ticks_per_quarter: u16,
    tracks: Vec<Track>,
}

impl Song {
    /// Create a song with no tracks
    pub fn new(tempo_bpm: f64, time_signature: TimeSignature, ticks_per_quarter: u16) -> Result<Self, SongError> {
        if !tempo_bpm.is_finite() || tempo_bpm <= 0.0 {
            return Err(SongError::InvalidTempo(tempo_bpm));
        }
        if ticks_per_quarter == 0 || ticks_per_quarter > MAX_TICKS_PER_QUARTER {
            return Err(SongError::InvalidResolution(ticks_per_quarter));
        }

        Ok(Song {
            tempo_bpm,
            time_signature,
            ticks_per_quarter,
            tracks: Vec::new(),
        })
    }

    /// Build a song from scheduled events, one track per channel in channel order
    ///
    /// Channels with an instrument in the config get its program change, and its
    /// name when track names are enabled. A tempo outside the usable range falls
    /// back to the default tempo.
    pub fn from_schedule(config: &SequencerConfig, events: Vec<ScheduledEvent>) -> Result<Self, SongError> {
        let tempo_bpm = if (MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&config.tempo_bpm) {
            config.tempo_bpm
        } else {
            let fallback = SequencerConfig::default().tempo_bpm;
            log::warn!(
                "Tempo {} BPM outside {}-{}, using {}",
                config.tempo_bpm,
                MIN_TEMPO_BPM,
                MAX_TEMPO_BPM,
                fallback
            );
            fallback
        };

        let mut song = Song::new(tempo_bpm, config.output_time_signature(), config.ticks_per_quarter)?;

        let mut by_channel: BTreeMap<u8, Vec<ScheduledEvent>> = BTreeMap::new();
        for event in events {
            by_channel.entry(event.channel()).or_default().push(event);
        }

        for (channel, channel_events) in by_channel {
            let mut track = Track::new(channel);

            if let Some(instrument) = config.instruments.get(&channel) {
                if let Some(program) = instrument.program() {
                    track = track.with_program(program);
                }
                if config.track_names {
                    track = track.with_name(instrument.display_name());
                }
            } else if config.track_names {
                track = track.with_name(format!("Channel {}", channel + 1));
            }

            for event in channel_events {
                track.push(event)?;
            }

            log::debug!("Track for channel {} holds {} notes", channel, track.events().len());
            song.add_track(track)?;
        }

        Ok(song)
    }

    /// Append a track
    pub fn add_track(&mut self, track: Track) -> Result<(), SongError> {
        if self.tracks.len() >= u16::MAX as usize {
            return Err(SongError::TooManyTracks);
        }
        self.tracks.push(track);
        Ok(())
    }

    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    /// Tempo as stored in the file: microseconds per quarter note
    ///
    /// Kept inside the 24-bit range of the tempo meta event.
    pub fn microseconds_per_quarter(&self) -> u32 {
        let micros = (60_000_000.0 / self.tempo_bpm + 0.5).floor();
        micros.clamp(1.0, 0xFF_FFFF as f64) as u32
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub(crate) fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}
