use citeflow_docs::text::slice_chars;
use citeflow_docs::{Document, DocumentStore};
use citeflow_llm::{GenerationOptions, GenerationRequest};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 10_000;

pub const DEFAULT_INSTRUCTIONS: &str = "\
You are an assistant that answers questions using only the provided documents.
Each document is introduced by a bracketed number such as [1] or [2].
When you use information from a document, cite it inline with that number, e.g. [1].

Instructions:
1. Answer the question using information from the documents
2. Cite with the document's bracketed number right after the information it supports
3. Be concise and accurate
4. If the documents don't contain relevant information, say so";

/// One document as it appears in the prompt
#[derive(Debug, Clone)]
pub struct ContextEntry {
    pub document_id: String,
    pub title: String,
    /// `full_text` cut to the context budget
    pub content: String,
    pub document: Arc<Document>,
}

/// Documents in prompt order. Marker `[n]` refers to entry `n - 1`.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    entries: Vec<ContextEntry>,
}

impl PromptContext {
    pub fn new(entries: Vec<ContextEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a 1-based marker number
    pub fn get(&self, marker: u32) -> Option<&ContextEntry> {
        let idx = (marker as usize).checked_sub(1)?;
        self.entries.get(idx)
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }
}

#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub context: PromptContext,
    pub instructions: String,
    /// Document blocks and the question
    pub body: String,
}

impl BuiltPrompt {
    pub fn to_request(&self, options: GenerationOptions) -> GenerationRequest {
        GenerationRequest::new(self.body.clone())
            .with_instructions(self.instructions.clone())
            .with_options(options)
    }
}

pub struct PromptBuilder {
    store: Arc<DocumentStore>,
    max_context_chars: usize,
    instructions: String,
}

impl PromptBuilder {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            store,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }

    pub fn with_max_context_chars(mut self, max: usize) -> Self {
        self.max_context_chars = max;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Load each document and render the prompt.
    ///
    /// Documents that fail to load are skipped; repeated ids appear once.
    pub async fn build(&self, query: &str, document_ids: &[String]) -> BuiltPrompt {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(document_ids.len());

        for id in document_ids {
            if !seen.insert(id.as_str()) {
                continue;
            }

            match self.store.load(id).await {
                Ok(document) => {
                    let content = slice_chars(&document.full_text, 0, self.max_context_chars).to_string();
                    entries.push(ContextEntry {
                        document_id: document.id.clone(),
                        title: document.title.clone(),
                        content,
                        document,
                    });
                }
                Err(e) => {
                    warn!(document_id = %id, error = %e, "Skipping document that failed to load");
                }
            }
        }

        let context = PromptContext::new(entries);
        let body = render_body(query, &context);
        debug!(documents = context.len(), body_chars = body.len(), "Built prompt");

        BuiltPrompt {
            context,
            instructions: self.instructions.clone(),
            body,
        }
    }
}

fn render_body(query: &str, context: &PromptContext) -> String {
    let blocks = context
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("[{}] Document: {}\nContent:\n{}", i + 1, entry.title, entry.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("Available Documents:\n{blocks}\n\nUser Question: {query}\n\nAnswer:")
}
