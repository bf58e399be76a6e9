use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use citeflow_api::{
    build_router,
    config::Config,
    registry::JobStatus,
    routes::chat::ChatResponse,
    state::AppState,
};
use citeflow_docs::{DocumentStore, InMemorySource, PdfDirectory};
use citeflow_llm::{FragmentStream, GenerationRequest, TextGenerator};
use citeflow_pipeline::Pipeline;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const CONFIG: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 0

    [cors]
    enabled = true
    origins = ["*"]

    [documents]
    directory = "unused"

    [llm]
    temperature = 0.7
    max_output_tokens = 256

    [logging]
    level = "info"
    format = "pretty"
"#;

struct FixedGenerator(Vec<&'static str>);

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn stream(&self, _request: GenerationRequest) -> anyhow::Result<FragmentStream> {
        let items: Vec<anyhow::Result<String>> = self.0.iter().map(|f| Ok(f.to_string())).collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }

    fn provider_name(&self) -> &'static str {
        "fixed"
    }
}

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    _pdf_dir: TempDir,
}

fn test_app(source: InMemorySource, fragments: Vec<&'static str>) -> TestApp {
    let config: Config = toml::from_str(CONFIG).unwrap();

    let pdf_dir = tempfile::tempdir().unwrap();
    std::fs::write(pdf_dir.path().join("doc_a.pdf"), b"%PDF-1.4 test").unwrap();

    let store = Arc::new(DocumentStore::new(Arc::new(source)));
    let pipeline = Pipeline::new(store.clone(), Arc::new(FixedGenerator(fragments)), config.run_config());
    let state = Arc::new(AppState::new(
        config,
        store,
        Arc::new(PdfDirectory::new(pdf_dir.path())),
        pipeline,
    ));

    TestApp {
        router: build_router(state.clone()),
        state,
        _pdf_dir: pdf_dir,
    }
}

fn doc_a() -> InMemorySource {
    InMemorySource::new().with_document("doc_a", ["X is defined as Y at position 500."])
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn create_job(app: &TestApp, body: Value) -> ChatResponse {
    let response = app.router.clone().oneshot(post_json("/api/chat", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = test_app(doc_a(), vec![]);

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["documents"], "1 available");
}

#[tokio::test]
async fn test_chat_rejects_empty_query() {
    let app = test_app(doc_a(), vec![]);

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/chat", json!({"query": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_keeps_conversation_id() {
    let app = test_app(doc_a(), vec![]);

    let created = create_job(&app, json!({"query": "What is X?", "conversationId": "conv-7"})).await;
    assert_eq!(created.conversation_id, "conv-7");

    let job = app.state.jobs.get_job(&created.job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.query, "What is X?");

    let generated = create_job(&app, json!({"query": "Again"})).await;
    assert!(!generated.conversation_id.is_empty());
}

#[tokio::test]
async fn test_stream_job_as_sse() {
    let app = test_app(doc_a(), vec!["X is ", "defined as Y [1].", " More info."]);
    let created = create_job(&app, json!({"query": "What is X?"})).await;

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/api/stream/{}", created.job_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let body = body_string(response).await;
    assert_eq!(body.matches("event: tool_call").count(), 4);
    assert_eq!(body.matches("event: text").count(), 3);
    assert!(body.contains("event: citation"));
    assert!(body.contains("\"documentId\":\"doc_a\""));
    assert!(body.contains("event: source"));
    assert!(body.contains("event: done"));
    assert!(!body.contains("\"event\":"));

    let job = app.state.jobs.get_job(&created.job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn test_stream_without_documents_marks_job_failed() {
    let app = test_app(InMemorySource::new(), vec!["unused"]);
    let created = create_job(&app, json!({"query": "Anything?"})).await;

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/api/stream/{}", created.job_id)))
        .await
        .unwrap();
    let body = body_string(response).await;

    assert!(body.contains("event: error"));
    assert!(body.contains("no_documents"));
    assert!(!body.contains("event: tool_call"));

    let job = app.state.jobs.get_job(&created.job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
}

#[tokio::test]
async fn test_stream_job_only_once() {
    let app = test_app(doc_a(), vec!["ok"]);
    let created = create_job(&app, json!({"query": "q"})).await;
    let uri = format!("/api/stream/{}", created.job_id);

    let first = app.router.clone().oneshot(get(&uri)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    body_string(first).await;

    let second = app.router.clone().oneshot(get(&uri)).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_stream_unknown_job() {
    let app = test_app(doc_a(), vec![]);

    let response = app.router.clone().oneshot(get("/api/stream/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_documents() {
    let source = doc_a().with_document("annual_report", ["Revenue grew."]);
    let app = test_app(source, vec![]);

    let response = app.router.clone().oneshot(get("/api/documents")).await.unwrap();
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();

    assert_eq!(
        body,
        json!([
            {"documentId": "annual_report", "title": "Annual Report"},
            {"documentId": "doc_a", "title": "Doc A"}
        ])
    );
}

#[tokio::test]
async fn test_get_pdf() {
    let app = test_app(doc_a(), vec![]);

    let response = app.router.clone().oneshot(get("/api/pdf/doc_a")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(body_string(response).await, "%PDF-1.4 test");

    let missing = app.router.clone().oneshot(get("/api/pdf/other")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let traversal = app.router.clone().oneshot(get("/api/pdf/..%2Fdoc_a")).await.unwrap();
    assert_eq!(traversal.status(), StatusCode::NOT_FOUND);
}
