use citeflow_docs::{DocumentStore, PdfDirectory};
use citeflow_pipeline::Pipeline;
use std::sync::Arc;

use crate::config::Config;
use crate::registry::JobRegistry;

/// Shared application state passed to all handlers
///
/// The pipeline is stateless per run and built once at startup; the store's
/// cache and the job table live as long as the server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<DocumentStore>,
    pub pdfs: Arc<PdfDirectory>,
    pub pipeline: Arc<Pipeline>,
    pub jobs: Arc<JobRegistry>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<DocumentStore>, pdfs: Arc<PdfDirectory>, pipeline: Pipeline) -> Self {
        Self {
            config: Arc::new(config),
            store,
            pdfs,
            pipeline: Arc::new(pipeline),
            jobs: Arc::new(JobRegistry::new()),
        }
    }
}
