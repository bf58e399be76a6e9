use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use citeflow_api::{
    build_router,
    config::{Config, JobsConfig},
    registry::JobRegistry,
    state::AppState,
};
use citeflow_docs::{DocumentStore, PdfDirectory};
use citeflow_llm::ClientFactory;
use citeflow_pipeline::Pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting citeflow API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let pdfs = Arc::new(PdfDirectory::new(&config.documents.directory));
    let store = Arc::new(DocumentStore::new(pdfs.clone()));
    tracing::info!(directory = %config.documents.directory, "Serving documents");

    let generator = ClientFactory::create_generator(config.provider_config())?;
    tracing::info!(provider = generator.provider_name(), "Generation backend ready");

    let pipeline = Pipeline::new(store.clone(), generator, config.run_config());
    let state = Arc::new(AppState::new(config.clone(), store, pdfs, pipeline));

    spawn_job_cleanup(Arc::clone(&state.jobs), &config.jobs);

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_job_cleanup(jobs: Arc<JobRegistry>, config: &JobsConfig) {
    let max_age = chrono::Duration::seconds(config.max_age_secs as i64);
    let period = Duration::from_secs(config.cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = jobs.cleanup_older_than(max_age).await;
            if removed > 0 {
                tracing::debug!(removed, "Expired jobs removed");
            }
        }
    });
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        }
        _ => {
            registry.with(tracing_subscriber::fmt::layer().pretty()).init();
        }
    }
}
