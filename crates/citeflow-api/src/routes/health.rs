use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Reports whether the document directory can be listed.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut services = HashMap::new();

    let documents = match state.store.list_available().await {
        Ok(ids) => format!("{} available", ids.len()),
        Err(e) => {
            tracing::warn!(error = %e, "Document listing failed during health check");
            "unavailable".to_string()
        }
    };
    services.insert("documents".to_string(), documents);
    services.insert("jobs".to_string(), format!("{} tracked", state.jobs.len().await));

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
