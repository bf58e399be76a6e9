use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Failed to extract text from {document_id}: {message}")]
    Extraction { document_id: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, DocumentError>;
