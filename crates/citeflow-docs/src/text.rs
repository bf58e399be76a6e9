//! Character-offset helpers.
//!
//! Offsets throughout the crate count `char`s, not bytes, so slicing never
//! lands inside a multi-byte sequence.

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Slice `text` by char offsets, clamping both ends to the text.
pub fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end.max(start));
    &text[start_byte..end_byte]
}

/// Char offset of the first case-insensitive occurrence of `needle`.
///
/// Folding is per char (first char of the lowercase mapping), so offsets in
/// the folded text map 1:1 onto `haystack`.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().map(fold).collect();
    if needle.is_empty() {
        return Some(0);
    }

    let hay: Vec<char> = haystack.chars().map(fold).collect();
    if needle.len() > hay.len() {
        return None;
    }

    hay.windows(needle.len()).position(|window| window == needle.as_slice())
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}
