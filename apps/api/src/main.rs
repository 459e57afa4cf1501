mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::pipeline::AnalysisPipeline;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer API v{}", env!("CARGO_PKG_VERSION"));

    if config.analysis.api_key.is_none() {
        warn!("LOVABLE_API_KEY is not set; every analysis will fail with a configuration error");
    }
    if config.analysis.max_resume_chars.is_none() {
        info!("No resume length limit configured (MAX_RESUME_CHARS)");
    }

    // Initialize LLM client
    let llm = LlmClient::new(config.analysis.completion_url.clone(), config.analysis.timeout)?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?}, json_mode: {})",
        config.analysis.model, config.analysis.timeout, config.analysis.json_mode
    );

    // Build app state
    let state = AppState {
        pipeline: Arc::new(AnalysisPipeline::new(
            config.analysis.clone(),
            Arc::new(llm),
        )),
        retry: config.retry,
    };
    info!("Upstream retry policy: {:?}", state.retry);

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
