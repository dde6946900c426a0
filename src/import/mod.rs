// Import - Turn hand-written or pasted hex into valid MIDI files
// Decodes hex text, repairs missing chunk framing, and renders hex dumps

pub mod dump;
pub mod hex;
pub mod repair;

pub use self::dump::hex_dump;
pub use self::hex::{clean_hex_text, decode_hex_text, trim_zero_padding, ImportError};
pub use self::repair::{classify, import_hex, repair, ImportedFile, PayloadKind, REPAIR_TICKS_PER_QUARTER};
