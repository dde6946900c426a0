// Hex dump - human-readable rendering of MIDI bytes for diffing

/// Title line written at the top of every dump
///
/// It is a `//` comment, so a dump decodes back to the same bytes.
pub const DUMP_TITLE: &str = "// Full MIDI Hex";

/// Byte pairs per dump line
pub const BYTES_PER_LINE: usize = 16;

/// Render bytes as uppercase hex pairs, 16 per line, under a title comment
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut dump = String::with_capacity(DUMP_TITLE.len() + 1 + bytes.len() * 3);
    dump.push_str(DUMP_TITLE);
    dump.push('\n');

    for line in bytes.chunks(BYTES_PER_LINE) {
        let pairs: Vec<String> = line.iter().map(|byte| format!("{:02X}", byte)).collect();
        dump.push_str(&pairs.join(" "));
        dump.push('\n');
    }

    dump
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::decode_hex_text;

    #[test]
    fn test_hex_dump_layout() {
        let bytes: Vec<u8> = (0u8..20).collect();
        let dump = hex_dump(&bytes);
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "// Full MIDI Hex");
        assert_eq!(lines[1], "00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F");
        assert_eq!(lines[2], "10 11 12 13");
    }

    #[test]
    fn test_hex_dump_uppercase() {
        assert_eq!(hex_dump(&[0xFF, 0x2F, 0x00]), "// Full MIDI Hex\nFF 2F 00\n");
    }

    #[test]
    fn test_hex_dump_empty() {
        assert_eq!(hex_dump(&[]), "// Full MIDI Hex\n");
    }

    #[test]
    fn test_dump_decodes_back() {
        let bytes = [0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, 0xAB];
        assert_eq!(decode_hex_text(&hex_dump(&bytes)).unwrap(), bytes.to_vec());
    }
}
