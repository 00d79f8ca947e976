mod analysis;
mod auth;
mod chat;
mod config;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod logs;
mod models;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::store::PgAnalysisStore;
use crate::chat::store::PgSessionStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::pdf_co::PdfCoClient;
use crate::llm_client::LlmClient;
use crate::logs::FileLog;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerCortex API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize provider clients; missing keys only fail the calls that need them
    if config.groq_api_key.is_none() {
        warn!("GROQ_API_KEY is not set; chat and analysis requests will fail");
    }
    if config.pdf_co_api_key.is_none() {
        warn!("PDF_CO_API_KEY is not set; PDF and image processing will fail");
    }
    let llm = LlmClient::new(
        config.groq_api_key.clone(),
        config.completion_api_url.clone(),
    );
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let extractor = PdfCoClient::new(
        config.pdf_co_api_key.clone(),
        config.extraction_api_url.clone(),
    );

    let chat_log = FileLog::new(config.log_dir.clone());
    let analysis_log = FileLog::new(config.analysis_dir.clone());
    info!(
        "Chat records in {}, analysis output in {}",
        chat_log.dir().display(),
        analysis_log.dir().display()
    );

    // Build app state
    let state = AppState {
        sessions: Arc::new(PgSessionStore::new(db.clone())),
        analyses: Arc::new(PgAnalysisStore::new(db)),
        completion: Arc::new(llm),
        extractor: Arc::new(extractor),
        chat_log,
        analysis_log,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
