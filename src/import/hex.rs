// Hex text decoding - comment stripping, hex validation, zero-padding cleanup

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    #[error("Malformed hex input: {0}")]
    MalformedHexInput(#[from] hex::FromHexError),

    #[error("Hex input holds no bytes once zero padding is removed")]
    EmptyPayload,
}

/// Remove `//` comments and all whitespace, leaving only the hex digits
pub fn clean_hex_text(text: &str) -> String {
    text.lines()
        .map(|line| match line.find("//") {
            Some(comment) => &line[..comment],
            None => line,
        })
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Decode hex text (comments and whitespace allowed) into bytes
///
/// Odd-length input and non-hex characters are both rejected.
pub fn decode_hex_text(text: &str) -> Result<Vec<u8>, ImportError> {
    let digits = clean_hex_text(text);
    Ok(hex::decode(digits)?)
}

/// Strip leading and trailing zero bytes
///
/// A payload whose trimmed form ends in the `FF 2F` end-of-track prefix keeps
/// one trailing zero, since that zero is the meta event's length byte. Any
/// other trailing zero is dropped even when it is a data byte, such as the
/// velocity of a final `80 3C 00` note-off, so raw payloads should end with
/// an end-of-track event.
pub fn trim_zero_padding(bytes: &[u8]) -> &[u8] {
    let Some(start) = bytes.iter().position(|&b| b != 0) else {
        return &[];
    };
    let end = bytes.iter().rposition(|&b| b != 0).map_or(start, |i| i + 1);

    let trimmed = &bytes[start..end];
    if trimmed.ends_with(&[0xFF, 0x2F]) && end < bytes.len() {
        &bytes[start..end + 1]
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_hex_text() {
        let text = "// Lead line\n4D 54 68 64 // header\n\t00 00\r\n00 06 //trailing";
        assert_eq!(clean_hex_text(text), "4D54686400000006");
    }

    #[test]
    fn test_decode_hex_text() {
        assert_eq!(decode_hex_text("90 3c 64").unwrap(), vec![0x90, 0x3C, 0x64]);
        assert_eq!(decode_hex_text("// nothing here\n").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(
            decode_hex_text("90 3C 6"),
            Err(ImportError::MalformedHexInput(hex::FromHexError::OddLength))
        );
        assert!(matches!(
            decode_hex_text("90 3G"),
            Err(ImportError::MalformedHexInput(
                hex::FromHexError::InvalidHexCharacter { c: 'G', .. }
            ))
        ));
    }

    #[test]
    fn test_trim_zero_padding() {
        assert_eq!(trim_zero_padding(&[0, 0, 0x90, 0x3C, 0x64, 0, 0]), &[0x90, 0x3C, 0x64]);
        assert_eq!(trim_zero_padding(&[0x90, 0x3C, 0x64]), &[0x90, 0x3C, 0x64]);
        assert_eq!(trim_zero_padding(&[0, 0, 0]), &[] as &[u8]);
        assert_eq!(trim_zero_padding(&[]), &[] as &[u8]);
    }

    #[test]
    fn test_trim_keeps_end_of_track_length() {
        let bytes = [0x00, 0x90, 0x3C, 0x64, 0x00, 0xFF, 0x2F, 0x00, 0x00, 0x00];
        assert_eq!(
            trim_zero_padding(&bytes),
            &[0x90, 0x3C, 0x64, 0x00, 0xFF, 0x2F, 0x00]
        );
    }

    #[test]
    fn test_trim_drops_trailing_zero_data_byte() {
        // Note-off velocity is indistinguishable from padding
        assert_eq!(trim_zero_padding(&[0x60, 0x80, 0x3C, 0x00]), &[0x60, 0x80, 0x3C]);
        assert_eq!(
            trim_zero_padding(&[0x60, 0x80, 0x3C, 0x00, 0x00, 0xFF, 0x2F, 0x00]),
            &[0x60, 0x80, 0x3C, 0x00, 0x00, 0xFF, 0x2F, 0x00]
        );
    }
}
