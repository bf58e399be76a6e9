use citeflow_docs::DocumentError;
use citeflow_types::{ChatEvent, ErrorCode};
use thiserror::Error;

/// Fatal run failures. Each maps to exactly one terminal `error` event.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("No documents available")]
    NoDocumentsAvailable,

    #[error("None of the {requested} requested documents could be loaded")]
    NoDocumentsLoaded { requested: usize },

    #[error("Failed to list documents: {0}")]
    Listing(#[from] DocumentError),

    #[error("{0}")]
    GenerationFailed(String),
}

impl RunError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoDocumentsAvailable | Self::NoDocumentsLoaded { .. } | Self::Listing(_) => {
                ErrorCode::NoDocuments
            }
            Self::GenerationFailed(_) => ErrorCode::GenerationFailed,
        }
    }

    pub fn to_event(&self) -> ChatEvent {
        ChatEvent::error(self.code(), self.to_string())
    }
}

impl From<anyhow::Error> for RunError {
    fn from(err: anyhow::Error) -> Self {
        Self::GenerationFailed(format!("{err:#}"))
    }
}
