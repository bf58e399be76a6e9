use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::Result;
use crate::source::PageSource;
use crate::text::{char_len, find_ignore_case, slice_chars};

/// Separator placed between page texts in `full_text`
pub const PAGE_SEPARATOR: &str = "\n\n";

const SEARCH_CONTEXT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based
    pub number: u32,
    pub text: String,
}

/// A loaded document. Immutable once built.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub pages: Vec<Page>,
    pub full_text: String,
    /// Char offset of each page's first char within `full_text`
    page_starts: Vec<usize>,
}

impl Document {
    pub fn from_pages<I, S>(id: impl Into<String>, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        let pages: Vec<Page> = pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page {
                number: i as u32 + 1,
                text: text.into(),
            })
            .collect();

        let separator_len = char_len(PAGE_SEPARATOR);
        let mut page_starts = Vec::with_capacity(pages.len());
        let mut offset = 0;
        for page in &pages {
            page_starts.push(offset);
            offset += char_len(&page.text) + separator_len;
        }

        let full_text = pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR);

        Self {
            title: title_from_id(&id),
            id,
            pages,
            full_text,
            page_starts,
        }
    }

    /// Page number containing `char_offset` of `full_text`.
    ///
    /// Separator chars belong to the preceding page. Documents without pages
    /// report page 1.
    pub fn page_at(&self, char_offset: usize) -> u32 {
        let idx = self.page_starts.partition_point(|&start| start <= char_offset);
        idx.max(1) as u32
    }

    /// Text of `full_text` within `radius` chars of `char_offset`, trimmed
    pub fn excerpt_around(&self, char_offset: usize, radius: usize) -> String {
        self.excerpt_between(char_offset.saturating_sub(radius), char_offset.saturating_add(radius))
    }

    /// Trimmed `full_text` between two char offsets, clamped to the document
    pub fn excerpt_between(&self, start: usize, end: usize) -> String {
        slice_chars(&self.full_text, start, end).trim().to_string()
    }

    pub fn page_text(&self, number: u32) -> Option<&str> {
        self.pages
            .iter()
            .find(|page| page.number == number)
            .map(|page| page.text.as_str())
    }

    /// Case-insensitive search, one `(page, excerpt)` hit per matching page
    pub fn search(&self, term: &str) -> Vec<(u32, String)> {
        if term.is_empty() {
            return Vec::new();
        }

        let term_len = char_len(term);
        self.pages
            .iter()
            .filter_map(|page| {
                let idx = find_ignore_case(&page.text, term)?;
                let start = idx.saturating_sub(SEARCH_CONTEXT_CHARS);
                let end = idx + term_len + SEARCH_CONTEXT_CHARS;
                Some((page.number, slice_chars(&page.text, start, end).trim().to_string()))
            })
            .collect()
    }
}

/// Display title derived from a document id: `_` and `-` become spaces and
/// each word is capitalized.
pub fn title_from_id(id: &str) -> String {
    let mut title = String::with_capacity(id.len());
    let mut word_start = true;

    for c in id.chars() {
        let c = if c == '_' || c == '-' { ' ' } else { c };
        if c.is_whitespace() {
            title.push(c);
            word_start = true;
        } else if word_start {
            title.extend(c.to_uppercase());
            word_start = false;
        } else {
            title.extend(c.to_lowercase());
        }
    }

    title
}

/// Process-wide document cache in front of a [`PageSource`]
pub struct DocumentStore {
    source: Arc<dyn PageSource>,
    cache: RwLock<HashMap<String, Arc<Document>>>,
}

impl DocumentStore {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load a document, extracting it on first use.
    ///
    /// Concurrent first loads of the same id may both extract; the cached
    /// value is identical either way.
    pub async fn load(&self, document_id: &str) -> Result<Arc<Document>> {
        if let Some(doc) = self.cache.read().await.get(document_id) {
            return Ok(Arc::clone(doc));
        }

        let pages = self.source.load_pages(document_id).await?;
        let doc = Arc::new(Document::from_pages(document_id, pages));

        info!(
            document_id = %document_id,
            pages = doc.pages.len(),
            chars = char_len(&doc.full_text),
            "Loaded document"
        );

        self.cache
            .write()
            .await
            .insert(document_id.to_string(), Arc::clone(&doc));

        Ok(doc)
    }

    /// Ids present in storage right now, sorted
    pub async fn list_available(&self) -> Result<Vec<String>> {
        let mut ids = self.source.list_available().await?;
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Drop a cached document so the next load re-reads storage
    pub async fn invalidate(&self, document_id: &str) -> bool {
        let removed = self.cache.write().await.remove(document_id).is_some();
        if removed {
            debug!(document_id = %document_id, "Invalidated cached document");
        }
        removed
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }

    pub fn excerpt_around(&self, document: &Document, char_offset: usize, radius: usize) -> String {
        document.excerpt_around(char_offset, radius)
    }
}
