use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use citeflow_docs::title_from_id;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub document_id: String,
    pub title: String,
}

/// List documents currently in storage
pub async fn list_documents(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<DocumentSummary>>> {
    let documents = state
        .store
        .list_available()
        .await?
        .into_iter()
        .map(|id| DocumentSummary {
            title: title_from_id(&id),
            document_id: id,
        })
        .collect();

    Ok(Json(documents))
}

/// Serve the original PDF
pub async fn get_pdf(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let bytes = state.pdfs.read_bytes(&document_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, format!("inline; filename=\"{document_id}.pdf\"")),
        ],
        bytes,
    ))
}
