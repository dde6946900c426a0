// Event Scheduler - Merges note events, snaps them to the grid, and orders them per channel
//
// Algorithm:
// 1. Validate each event (channel, pitch, velocity, start, duration), clamping
//    or dropping with a recorded warning; nothing here aborts a song
// 2. Optionally rescale times to 4/4, then snap start and duration to grid units
// 3. Stable-sort by snapped start so ties keep their source order
// 4. Melodic channels: push each note to start no earlier than the previous
//    note's end on the same channel (a monophonic stream per channel)
//    Percussion channel: leave simultaneous hits where they are
// 5. Convert grid units to ticks

use serde::Serialize;

use super::grid::normalize;
use super::quantize::{beat_to_grid_units, grid_units_to_ticks};
use crate::arranger::vlq::MAX_VLQ;
use crate::config::SequencerConfig;
use crate::events::{EventSource, NoteEvent, ScheduledEvent};

/// A per-event problem the scheduler recovered from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleWarning {
    /// Pitch outside 0-127, clamped
    PitchClamped { index: usize, pitch: i32 },

    /// Velocity outside 0-127, clamped
    VelocityClamped { index: usize, velocity: i32 },

    /// Negative start, moved to beat 0
    StartClamped { index: usize, start_beat: f64 },

    /// Channel above 15, event dropped
    ChannelOutOfRange { index: usize, channel: u8 },

    /// Start is NaN or infinite, event dropped
    InvalidStart { index: usize },

    /// Duration is zero, negative, or not finite, event dropped
    NonPositiveDuration { index: usize, duration_beat: f64 },

    /// Start and end land on the same tick at this resolution, event dropped
    ZeroLength { index: usize },

    /// Note ends past the largest encodable tick, event dropped
    BeyondMaxTick { index: usize },
}

/// Output of a scheduling pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleReport {
    /// Scheduled events ordered by start tick
    pub events: Vec<ScheduledEvent>,

    /// Everything that was clamped or dropped along the way
    pub warnings: Vec<ScheduleWarning>,
}

impl ScheduleReport {
    /// Number of events that did not make it into the schedule
    pub fn dropped_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|warning| {
                !matches!(
                    warning,
                    ScheduleWarning::PitchClamped { .. }
                        | ScheduleWarning::VelocityClamped { .. }
                        | ScheduleWarning::StartClamped { .. }
                )
            })
            .count()
    }
}

/// An event that passed validation, in grid units
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    channel: u8,
    start_units: u64,
    duration_units: u64,
    pitch: u8,
    velocity: u8,
}

/// Quantizes and orders note events according to a sequencer config
#[derive(Debug, Clone)]
pub struct Scheduler<'a> {
    config: &'a SequencerConfig,
}

impl<'a> Scheduler<'a> {
    /// Create a scheduler bound to a config
    pub fn new(config: &'a SequencerConfig) -> Self {
        Scheduler { config }
    }

    /// Schedule events, logging and discarding the warnings
    pub fn schedule(&self, events: Vec<NoteEvent>) -> Vec<ScheduledEvent> {
        self.schedule_with_report(events).events
    }

    /// Merge several sources in order, then schedule them as one stream
    pub fn schedule_sources(&self, sources: &[&dyn EventSource]) -> ScheduleReport {
        let mut merged = Vec::new();
        for source in sources {
            let events = source.note_events();
            log::debug!("Source {} produced {} events", source.source_name(), events.len());
            merged.extend(events);
        }
        self.schedule_with_report(merged)
    }

    /// Schedule events and report every clamp and drop
    pub fn schedule_with_report(&self, events: Vec<NoteEvent>) -> ScheduleReport {
        let mut warnings = Vec::new();
        let total = events.len();

        let mut candidates: Vec<Candidate> = events
            .into_iter()
            .enumerate()
            .filter_map(|(index, event)| self.validate(index, event, &mut warnings))
            .collect();

        // Stable: equal starts keep source order
        candidates.sort_by_key(|candidate| candidate.start_units);

        let mut last_end_units = [0u64; 16];
        let mut scheduled = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let channel = candidate.channel as usize;
            let is_percussion = candidate.channel == self.config.percussion_channel;

            let start_units = if is_percussion {
                candidate.start_units
            } else {
                candidate.start_units.max(last_end_units[channel])
            };
            let end_units = start_units.saturating_add(candidate.duration_units);

            let start_tick = self.units_to_ticks(start_units);
            let end_tick = self.units_to_ticks(end_units);

            if end_tick > MAX_VLQ as u64 {
                log::warn!("Dropping event {}: ends beyond tick {}", candidate.index, MAX_VLQ);
                warnings.push(ScheduleWarning::BeyondMaxTick {
                    index: candidate.index,
                });
                continue;
            }
            if end_tick <= start_tick {
                log::warn!(
                    "Dropping event {}: shorter than one tick at {} PPQ",
                    candidate.index,
                    self.config.ticks_per_quarter
                );
                warnings.push(ScheduleWarning::ZeroLength {
                    index: candidate.index,
                });
                continue;
            }

            if !is_percussion {
                last_end_units[channel] = end_units;
            }

            scheduled.push(ScheduledEvent::new(
                candidate.channel,
                start_tick as u32,
                (end_tick - start_tick) as u32,
                candidate.pitch,
                candidate.velocity,
            ));
        }

        // Pushing notes later can reorder them across channels
        scheduled.sort_by_key(|event| event.start_tick());

        log::debug!(
            "Scheduled {} of {} events ({} warnings)",
            scheduled.len(),
            total,
            warnings.len()
        );

        ScheduleReport {
            events: scheduled,
            warnings,
        }
    }

    /// Check one event and convert it to grid units, or drop it
    fn validate(
        &self,
        index: usize,
        event: NoteEvent,
        warnings: &mut Vec<ScheduleWarning>,
    ) -> Option<Candidate> {
        let channel = if event.is_percussion() {
            self.config.percussion_channel
        } else {
            event.channel()
        };
        if channel > 15 {
            log::warn!("Dropping event {}: channel {} out of range", index, channel);
            warnings.push(ScheduleWarning::ChannelOutOfRange { index, channel });
            return None;
        }

        let mut start_beat = event.start_beat();
        if !start_beat.is_finite() {
            log::warn!("Dropping event {}: start is not a number", index);
            warnings.push(ScheduleWarning::InvalidStart { index });
            return None;
        }
        if start_beat < 0.0 {
            log::warn!("Event {}: negative start {} moved to 0", index, start_beat);
            warnings.push(ScheduleWarning::StartClamped { index, start_beat });
            start_beat = 0.0;
        }

        let mut duration_beat = event.duration_beat();
        if !duration_beat.is_finite() || duration_beat <= 0.0 {
            log::warn!("Dropping event {}: duration {} is not positive", index, duration_beat);
            warnings.push(ScheduleWarning::NonPositiveDuration {
                index,
                duration_beat,
            });
            return None;
        }

        if self.config.normalize_meter {
            start_beat = normalize(start_beat, self.config.time_signature);
            duration_beat = normalize(duration_beat, self.config.time_signature);
        }

        let pitch = event.pitch();
        if !(0..=127).contains(&pitch) {
            log::warn!("Event {}: pitch {} clamped to 0-127", index, pitch);
            warnings.push(ScheduleWarning::PitchClamped { index, pitch });
        }
        let velocity = event.velocity();
        if !(0..=127).contains(&velocity) {
            log::warn!("Event {}: velocity {} clamped to 0-127", index, velocity);
            warnings.push(ScheduleWarning::VelocityClamped { index, velocity });
        }

        let grid = self.config.grid;
        Some(Candidate {
            index,
            channel,
            start_units: beat_to_grid_units(start_beat, grid),
            // Anything positive lasts at least one grid step
            duration_units: beat_to_grid_units(duration_beat, grid).max(1),
            pitch: pitch.clamp(0, 127) as u8,
            velocity: velocity.clamp(0, 127) as u8,
        })
    }

    fn units_to_ticks(&self, units: u64) -> u64 {
        grid_units_to_ticks(units, self.config.grid, self.config.ticks_per_quarter)
    }
}
