use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use citeflow_docs::DocumentError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job {0} has already been streamed")]
    JobAlreadyStarted(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Document error: {0}")]
    Document(DocumentError),
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound(id) => Self::DocumentNotFound(id),
            other => Self::Document(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::JobNotFound(_) | ApiError::DocumentNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::JobAlreadyStarted(_) => (StatusCode::CONFLICT, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Document(ref e) => {
                tracing::error!("Document error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Document error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
