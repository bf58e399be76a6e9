use async_stream::stream;
use citeflow_docs::DocumentStore;
use citeflow_llm::TextGenerator;
use citeflow_types::{ChatEvent, RunConfig, ToolCallStatus, ANALYZE_CONTENT, SEARCH_DOCUMENTS};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::RunError;
use crate::prompt::PromptBuilder;
use crate::scanner::CitationScanner;

pub type EventStream = Pin<Box<dyn Stream<Item = ChatEvent> + Send>>;

/// Query for one run
#[derive(Debug, Clone, Default)]
pub struct RunInput {
    pub query: String,
    /// Documents to answer from, in citation order. Empty means every
    /// available document.
    pub document_ids: Vec<String>,
}

impl RunInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            document_ids: Vec::new(),
        }
    }

    pub fn with_document_ids(mut self, ids: Vec<String>) -> Self {
        self.document_ids = ids;
        self
    }
}

/// Turns a query into an ordered event stream: tool-call progress, answer
/// text with citations as they appear, source cards, then `done` or `error`.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<DocumentStore>,
    generator: Arc<dyn TextGenerator>,
    config: RunConfig,
}

impl Pipeline {
    pub fn new(store: Arc<DocumentStore>, generator: Arc<dyn TextGenerator>, config: RunConfig) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Lazy event stream for one run.
    ///
    /// Nothing happens until the stream is polled; dropping it cancels the
    /// run along with the upstream generation. Exactly one terminal event is
    /// produced and nothing follows it.
    pub fn stream(&self, input: RunInput) -> EventStream {
        let store = Arc::clone(&self.store);
        let generator = Arc::clone(&self.generator);
        let config = self.config.clone();
        let run_id = Uuid::new_v4().to_string();

        Box::pin(stream! {
            let started = Instant::now();
            info!(run_id = %run_id, provider = generator.provider_name(), "Run started");

            let document_ids = if input.document_ids.is_empty() {
                match store.list_available().await {
                    Ok(ids) => ids,
                    Err(e) => {
                        let err = RunError::from(e);
                        warn!(run_id = %run_id, error = %err, "Run aborted");
                        yield err.to_event();
                        return;
                    }
                }
            } else {
                input.document_ids
            };

            if document_ids.is_empty() {
                warn!(run_id = %run_id, "No documents available");
                yield RunError::NoDocumentsAvailable.to_event();
                return;
            }

            let search_id = format!("tc-search-{run_id}");
            let analyze_id = format!("tc-analyze-{run_id}");

            yield ChatEvent::tool_call(ToolCallStatus::running(
                &search_id,
                SEARCH_DOCUMENTS,
                "Searching available documents...",
            ));

            let prompt = PromptBuilder::new(store)
                .with_max_context_chars(config.max_context_chars)
                .build(&input.query, &document_ids)
                .await;

            if prompt.context.is_empty() {
                let err = RunError::NoDocumentsLoaded { requested: document_ids.len() };
                warn!(run_id = %run_id, error = %err, "Run aborted");
                yield ChatEvent::tool_call(ToolCallStatus::failed(
                    &search_id,
                    SEARCH_DOCUMENTS,
                    "No documents could be loaded",
                ));
                yield err.to_event();
                return;
            }

            yield ChatEvent::tool_call(ToolCallStatus::completed(
                &search_id,
                SEARCH_DOCUMENTS,
                format!("Found {} documents", prompt.context.len()),
            ));
            yield ChatEvent::tool_call(ToolCallStatus::running(
                &analyze_id,
                ANALYZE_CONTENT,
                "Analyzing document content...",
            ));

            let request = prompt.to_request(config.generation);

            yield ChatEvent::tool_call(ToolCallStatus::completed(
                &analyze_id,
                ANALYZE_CONTENT,
                "Analysis complete",
            ));

            let mut fragments = match generator.stream(request).await {
                Ok(fragments) => fragments,
                Err(e) => {
                    let err = RunError::from(e);
                    error!(run_id = %run_id, error = %err, "Generation failed to start");
                    yield err.to_event();
                    return;
                }
            };

            let mut scanner = CitationScanner::new(prompt.context, config.excerpt_policy);
            let mut fragment_count = 0usize;

            while let Some(item) = fragments.next().await {
                match item {
                    Ok(fragment) => {
                        if fragment.is_empty() {
                            continue;
                        }
                        fragment_count += 1;

                        let citations = scanner.on_fragment(&fragment);
                        yield ChatEvent::text(fragment);
                        for citation in citations {
                            yield ChatEvent::Citation { citation };
                        }
                    }
                    Err(e) => {
                        let err = RunError::from(e);
                        error!(run_id = %run_id, fragments = fragment_count, error = %err, "Generation failed mid-stream");
                        yield err.to_event();
                        return;
                    }
                }
            }

            let sources = scanner.source_cards(config.source_url_prefix.as_deref());
            info!(
                run_id = %run_id,
                fragments = fragment_count,
                citations = scanner.cited_ids().count(),
                sources = sources.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Run completed"
            );

            for source in sources {
                yield ChatEvent::Source { source };
            }
            yield ChatEvent::Done;
        })
    }
}
