// Arranger - Songs, tracks, and the Standard MIDI File byte format
// Turns scheduled events into MIDI files and checks files against the container rules

pub mod chunk;
pub mod inspect;
pub mod midi;
pub mod song;
pub mod vlq;

pub use chunk::{ChunkError, HEADER_MAGIC, TRACK_MAGIC};
pub use inspect::{inspect, InspectError, SmfSummary, TrackSummary};
pub use midi::encode;
pub use song::{Song, SongError, Track};
pub use vlq::{decode_vlq, encode_vlq, VlqError, MAX_VLQ};
