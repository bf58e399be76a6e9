use async_stream::stream;
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use citeflow_pipeline::{ChatEvent, RunInput};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiResult;
use crate::registry::JobStatus;
use crate::state::AppState;

/// Stream a job's run as Server-Sent Events
///
/// Each event is written as `event: <name>` with the event's fields as JSON
/// data. A client disconnect drops the run.
pub async fn stream_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let job = state.jobs.claim(&job_id).await?;
    info!(job_id = %job.job_id, "Streaming job");

    let input = RunInput::new(job.query).with_document_ids(job.document_ids);
    let mut events = state.pipeline.stream(input);
    let jobs = Arc::clone(&state.jobs);

    let sse_stream = stream! {
        while let Some(event) = events.next().await {
            if event.is_terminal() {
                let status = match event {
                    ChatEvent::Done => JobStatus::Completed,
                    _ => JobStatus::Failed,
                };
                jobs.update_status(&job_id, status).await;
            }
            yield Ok::<Event, Infallible>(to_sse_event(&event));
        }
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

pub fn to_sse_event(event: &ChatEvent) -> Event {
    Event::default()
        .event(event.name())
        .data(event.payload().to_string())
}

