use citeflow_docs::text::{char_len, find_ignore_case, slice_chars};
use citeflow_types::ExcerptPolicy;

use crate::prompt::ContextEntry;

const LEADING_CHARS: usize = 200;
const LOOKBACK_CHARS: usize = 100;
const LOOKBACK_WORDS: usize = 10;
const MIN_TERM_CHARS: usize = 5;
const WINDOW_BEFORE: usize = 50;
const WINDOW_AFTER: usize = 150;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    pub text: String,
    pub page_number: u32,
}

/// Excerpt for a citation whose marker is preceded by `preceding_text`
pub fn resolve(policy: ExcerptPolicy, preceding_text: &str, entry: &ContextEntry) -> Excerpt {
    match policy {
        ExcerptPolicy::Leading => leading(entry),
        ExcerptPolicy::TermSearch => term_search(preceding_text, entry).unwrap_or_else(|| leading(entry)),
    }
}

/// Opening text of the document
pub fn leading(entry: &ContextEntry) -> Excerpt {
    let head = slice_chars(&entry.content, 0, LEADING_CHARS).trim();
    Excerpt {
        text: format!("{head}{ELLIPSIS}"),
        page_number: 1,
    }
}

/// Window around the first document hit of a significant word written just
/// before the marker
pub fn term_search(preceding_text: &str, entry: &ContextEntry) -> Option<Excerpt> {
    let total = char_len(preceding_text);
    let lookback = slice_chars(preceding_text, total.saturating_sub(LOOKBACK_CHARS), total);

    let words: Vec<&str> = lookback.split_whitespace().collect();
    let recent = &words[words.len().saturating_sub(LOOKBACK_WORDS)..];

    recent
        .iter()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| char_len(word) >= MIN_TERM_CHARS)
        .find_map(|word| find_ignore_case(&entry.content, word))
        .map(|pos| {
            // The prompt content is a prefix of the document text; stay inside it
            let end = (pos + WINDOW_AFTER).min(char_len(&entry.content));
            let window = entry.document.excerpt_between(pos.saturating_sub(WINDOW_BEFORE), end);
            Excerpt {
                text: format!("{ELLIPSIS}{window}{ELLIPSIS}"),
                page_number: entry.document.page_at(pos),
            }
        })
}
