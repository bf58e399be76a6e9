use citeflow_types::{Citation, ExcerptPolicy, SourceCard};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;
use tracing::debug;

use crate::excerpt;
use crate::prompt::PromptContext;

static MARKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("citation marker pattern is valid"));

/// Detects citation markers in a growing answer.
///
/// Every fragment triggers a rescan of the whole accumulated text, so a
/// marker split across fragments is seen once it is complete and never in a
/// partial form.
pub struct CitationScanner {
    context: PromptContext,
    policy: ExcerptPolicy,
    accumulated: String,
    emitted: BTreeSet<u32>,
}

impl CitationScanner {
    pub fn new(context: PromptContext, policy: ExcerptPolicy) -> Self {
        Self {
            context,
            policy,
            accumulated: String::new(),
            emitted: BTreeSet::new(),
        }
    }

    /// Append a fragment and return citations seen for the first time, in
    /// order of position in the text
    pub fn on_fragment(&mut self, fragment: &str) -> Vec<Citation> {
        self.accumulated.push_str(fragment);

        let mut found = Vec::new();
        for caps in MARKER_PATTERN.captures_iter(&self.accumulated) {
            let (Some(marker), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            // Digit runs too long for u32 are not valid markers
            let Ok(id) = digits.as_str().parse::<u32>() else {
                continue;
            };
            if self.emitted.contains(&id) {
                continue;
            }
            let Some(entry) = self.context.get(id) else {
                continue;
            };

            let preceding = &self.accumulated[..marker.start()];
            let start_index = preceding.chars().count();
            let end_index = start_index + marker.as_str().chars().count();
            let excerpt = excerpt::resolve(self.policy, preceding, entry);

            debug!(citation_id = id, document_id = %entry.document_id, "Citation detected");

            self.emitted.insert(id);
            found.push(Citation {
                id,
                document_id: entry.document_id.clone(),
                document_title: entry.title.clone(),
                page_number: excerpt.page_number,
                text: excerpt.text,
                start_index: Some(start_index),
                end_index: Some(end_index),
            });
        }

        found
    }

    /// One card per cited document, by ascending citation id
    pub fn source_cards(&self, url_prefix: Option<&str>) -> Vec<SourceCard> {
        let mut seen = HashSet::new();

        self.emitted
            .iter()
            .filter_map(|&id| self.context.get(id))
            .filter(|entry| seen.insert(entry.document_id.as_str()))
            .map(|entry| SourceCard {
                document_id: entry.document_id.clone(),
                title: entry.title.clone(),
                page_number: 1,
                excerpt: excerpt::leading(entry).text,
                url: url_prefix.map(|prefix| format!("{}/{}", prefix.trim_end_matches('/'), entry.document_id)),
            })
            .collect()
    }

    pub fn text(&self) -> &str {
        &self.accumulated
    }

    pub fn cited_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.emitted.iter().copied()
    }
}
