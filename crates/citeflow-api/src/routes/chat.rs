use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Empty means every available document
    #[serde(default)]
    pub document_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub job_id: String,
    pub conversation_id: String,
}

/// Register a query; the answer is streamed from `/api/stream/{job_id}`
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let conversation_id = req
        .conversation_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let job = state
        .jobs
        .create_job(query, conversation_id, req.document_ids)
        .await;

    info!(
        job_id = %job.job_id,
        conversation_id = %job.conversation_id,
        documents = job.document_ids.len(),
        "Chat job created"
    );

    Ok(Json(ChatResponse {
        job_id: job.job_id,
        conversation_id: job.conversation_id,
    }))
}
