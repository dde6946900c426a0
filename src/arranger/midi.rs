// MIDI Encoder - Serialize a song into Standard MIDI File bytes
// One track chunk per song track, each opening with meter and tempo meta events

use super::chunk::{write_header_chunk, write_track_chunk};
use super::song::{Song, Track};
use super::vlq::write_vlq;
use crate::groove::TimeSignature;

/// MIDI clocks per metronome click written in the time signature event
const CLOCKS_PER_CLICK: u8 = 24;

/// Notated 32nd notes per MIDI quarter note
const THIRTY_SECONDS_PER_QUARTER: u8 = 8;

/// An entry on a track's timeline, before delta encoding
#[derive(Debug, Clone, PartialEq, Eq)]
enum TimelineEvent<'a> {
    TrackName(&'a str),
    TimeSignature(TimeSignature),
    Tempo(u32),
    ProgramChange { channel: u8, program: u8 },
    NoteOff { channel: u8, pitch: u8 },
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    EndOfTrack,
}

impl TimelineEvent<'_> {
    /// Tie-break order for entries sharing a tick
    ///
    /// Note-offs come before note-ons so a repeated pitch is released
    /// before it sounds again.
    fn rank(&self) -> u8 {
        match self {
            TimelineEvent::TrackName(_)
            | TimelineEvent::TimeSignature(_)
            | TimelineEvent::Tempo(_)
            | TimelineEvent::EndOfTrack => 0,
            TimelineEvent::ProgramChange { .. } => 1,
            TimelineEvent::NoteOff { .. } => 2,
            TimelineEvent::NoteOn { .. } => 3,
        }
    }

    /// Append status and data bytes (everything after the delta)
    fn write(&self, buffer: &mut Vec<u8>) {
        match *self {
            TimelineEvent::TrackName(name) => {
                buffer.extend_from_slice(&[0xFF, 0x03]);
                write_vlq(name.len() as u32, buffer);
                buffer.extend_from_slice(name.as_bytes());
            }
            TimelineEvent::TimeSignature(signature) => {
                buffer.extend_from_slice(&[
                    0xFF,
                    0x58,
                    0x04,
                    signature.numerator(),
                    signature.denominator_power(),
                    CLOCKS_PER_CLICK,
                    THIRTY_SECONDS_PER_QUARTER,
                ]);
            }
            TimelineEvent::Tempo(micros) => {
                let [_, high, mid, low] = micros.to_be_bytes();
                buffer.extend_from_slice(&[0xFF, 0x51, 0x03, high, mid, low]);
            }
            TimelineEvent::ProgramChange { channel, program } => {
                buffer.extend_from_slice(&[0xC0 | channel, program]);
            }
            TimelineEvent::NoteOff { channel, pitch } => {
                buffer.extend_from_slice(&[0x80 | channel, pitch, 0]);
            }
            TimelineEvent::NoteOn { channel, pitch, velocity } => {
                buffer.extend_from_slice(&[0x90 | channel, pitch, velocity]);
            }
            TimelineEvent::EndOfTrack => {
                buffer.extend_from_slice(&[0xFF, 0x2F, 0x00]);
            }
        }
    }
}

/// Encode a song as a complete MIDI file
///
/// A song without tracks still produces a valid file holding one track with
/// only the meter, tempo and end-of-track meta events. Format is 0 for a single
/// track and 1 otherwise.
pub fn encode(song: Song) -> Vec<u8> {
    let time_signature = song.time_signature();
    let tempo = song.microseconds_per_quarter();
    let ticks_per_quarter = song.ticks_per_quarter();

    let mut tracks = song.into_tracks();
    if tracks.is_empty() {
        tracks.push(Track::new(0));
    }

    let format = if tracks.len() == 1 { 0 } else { 1 };

    let mut bytes = Vec::new();
    // Song::add_track caps the track count at u16::MAX
    write_header_chunk(&mut bytes, format, tracks.len() as u16, ticks_per_quarter);

    for track in &tracks {
        let payload = encode_track(track, time_signature, tempo);
        log::debug!(
            "Encoded channel {} track: {} notes, {} bytes",
            track.channel,
            track.events().len(),
            payload.len()
        );
        write_track_chunk(&mut bytes, &payload);
    }

    log::info!("Encoded MIDI file: {} tracks, {} bytes", tracks.len(), bytes.len());
    bytes
}

/// Build the delta-encoded event stream of one track
fn encode_track(track: &Track, time_signature: TimeSignature, tempo: u32) -> Vec<u8> {
    let channel = track.channel & 0x0F;
    let mut timeline: Vec<(u32, TimelineEvent)> = Vec::with_capacity(track.events().len() * 2 + 4);

    if let Some(name) = &track.name {
        timeline.push((0, TimelineEvent::TrackName(name)));
    }
    timeline.push((0, TimelineEvent::TimeSignature(time_signature)));
    timeline.push((0, TimelineEvent::Tempo(tempo)));
    if let Some(program) = track.program {
        timeline.push((0, TimelineEvent::ProgramChange {
            channel,
            program: program & 0x7F,
        }));
    }

    for event in track.events() {
        timeline.push((event.start_tick(), TimelineEvent::NoteOn {
            channel,
            pitch: event.pitch() & 0x7F,
            velocity: event.velocity() & 0x7F,
        }));
        timeline.push((event.end_tick(), TimelineEvent::NoteOff {
            channel,
            pitch: event.pitch() & 0x7F,
        }));
    }

    // Stable sort keeps insertion order within equal (tick, rank)
    timeline.sort_by_key(|(tick, event)| (*tick, event.rank()));

    let mut payload = Vec::with_capacity(timeline.len() * 4 + 4);
    let mut previous_tick = 0;
    for (tick, event) in &timeline {
        write_vlq(tick - previous_tick, &mut payload);
        event.write(&mut payload);
        previous_tick = *tick;
    }

    write_vlq(0, &mut payload);
    TimelineEvent::EndOfTrack.write(&mut payload);

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ScheduledEvent;
    use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

    fn song(tracks: Vec<Track>) -> Song {
        let mut song = Song::new(120.0, TimeSignature::COMMON, 480).unwrap();
        for track in tracks {
            song.add_track(track).unwrap();
        }
        song
    }

    fn track(channel: u8, notes: &[(u32, u32, u8)]) -> Track {
        let mut track = Track::new(channel);
        for &(start, duration, pitch) in notes {
            track.push(ScheduledEvent::new(channel, start, duration, pitch, 100)).unwrap();
        }
        track
    }

    /// Absolute-tick view of a parsed track
    fn absolute<'a>(events: &[midly::TrackEvent<'a>]) -> Vec<(u32, TrackEventKind<'a>)> {
        let mut tick = 0;
        events
            .iter()
            .map(|event| {
                tick += event.delta.as_int();
                (tick, event.kind)
            })
            .collect()
    }

    #[test]
    fn test_empty_song_bytes() {
        let bytes = encode(song(Vec::new()));

        let expected: Vec<u8> = vec![
            0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, // MThd, length 6
            0x00, 0x00, 0x00, 0x01, 0x01, 0xE0, // format 0, 1 track, 480 PPQ
            0x4D, 0x54, 0x72, 0x6B, 0x00, 0x00, 0x00, 0x13, // MTrk, length 19
            0x00, 0xFF, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08, // 4/4
            0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // 500000 us per quarter
            0x00, 0xFF, 0x2F, 0x00, // end of track
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_single_note_bytes() {
        let bytes = encode(song(vec![track(0, &[(0, 480, 60)])]));
        let payload = &bytes[22..];

        assert_eq!(
            &payload[15..],
            &[
                0x00, 0x90, 0x3C, 0x64, // note on at 0
                0x83, 0x60, 0x80, 0x3C, 0x00, // note off 480 ticks later
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
        assert_eq!(&bytes[18..22], &(payload.len() as u32).to_be_bytes());
    }

    #[test]
    fn test_parses_with_midly() {
        let drums = track(9, &[(0, 120, 36), (480, 120, 38)]);
        let bass = track(1, &[(0, 960, 40)]).with_program(32);
        let bytes = encode(song(vec![bass, drums]));

        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.format, Format::Parallel);
        assert_eq!(smf.header.timing, Timing::Metrical(midly::num::u15::new(480)));
        assert_eq!(smf.tracks.len(), 2);

        let bass_events = absolute(&smf.tracks[0]);
        assert!(matches!(
            bass_events[0].1,
            TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8))
        ));
        match bass_events[1].1 {
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => assert_eq!(tempo.as_int(), 500_000),
            other => panic!("Expected tempo, got {:?}", other),
        }
        match bass_events[2].1 {
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange { program },
            } => {
                assert_eq!(channel.as_int(), 1);
                assert_eq!(program.as_int(), 32);
            }
            other => panic!("Expected program change, got {:?}", other),
        }

        let last = bass_events.last().unwrap();
        assert_eq!(last.0, 960);
        assert_eq!(last.1, TrackEventKind::Meta(MetaMessage::EndOfTrack));

        let drum_notes: Vec<(u32, u8)> = absolute(&smf.tracks[1])
            .into_iter()
            .filter_map(|(tick, kind)| match kind {
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn { key, .. },
                } => {
                    assert_eq!(channel.as_int(), 9);
                    Some((tick, key.as_int()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(drum_notes, vec![(0, 36), (480, 38)]);
    }

    #[test]
    fn test_note_off_precedes_note_on_at_same_tick() {
        // Back-to-back repeats of one pitch
        let bytes = encode(song(vec![track(0, &[(0, 240, 60), (240, 240, 60)])]));
        let smf = Smf::parse(&bytes).unwrap();

        let at_240: Vec<TrackEventKind> = absolute(&smf.tracks[0])
            .into_iter()
            .filter(|(tick, _)| *tick == 240)
            .map(|(_, kind)| kind)
            .collect();

        assert_eq!(at_240.len(), 2);
        assert!(matches!(
            at_240[0],
            TrackEventKind::Midi {
                message: MidiMessage::NoteOff { .. },
                ..
            }
        ));
        assert!(matches!(
            at_240[1],
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_track_name_and_meter() {
        let mut song = Song::new(90.0, TimeSignature::new(6, 8).unwrap(), 96).unwrap();
        song.add_track(track(2, &[(0, 48, 64)]).with_name("Piano")).unwrap();

        let bytes = encode(song);
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.format, Format::SingleTrack);

        let events = &smf.tracks[0];
        assert_eq!(events[0].kind, TrackEventKind::Meta(MetaMessage::TrackName(b"Piano")));
        assert_eq!(
            events[1].kind,
            TrackEventKind::Meta(MetaMessage::TimeSignature(6, 3, 24, 8))
        );
        match events[2].kind {
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => assert_eq!(tempo.as_int(), 666_667),
            other => panic!("Expected tempo, got {:?}", other),
        }
    }

    #[test]
    fn test_declared_lengths_match() {
        let bytes = encode(song(vec![
            track(0, &[(0, 480, 60), (480, 480, 67)]),
            track(1, &[(0, 1920, 48)]),
            track(9, &[(0, 120, 36)]),
        ]));

        assert_eq!(&bytes[8..10], &[0x00, 0x01]);
        assert_eq!(&bytes[10..12], &[0x00, 0x03]);

        let chunks = crate::arranger::chunk::read_chunks(&bytes).unwrap();
        assert_eq!(chunks.len(), 4);
        for chunk in &chunks[1..] {
            assert!(chunk.is_track());
            assert!(chunk.body.ends_with(&[0x00, 0xFF, 0x2F, 0x00]));
        }
    }
}
