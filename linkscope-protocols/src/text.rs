//! Free-text field cleanup

/// Decode a TLV string value for display
///
/// Invalid UTF-8 is replaced, NUL terminators and other control characters
/// are dropped, surrounding whitespace is trimmed.
pub fn clean_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// True when every byte is printable ASCII or whitespace
pub fn is_printable(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|b| b.is_ascii_graphic() || *b == b' ')
}
