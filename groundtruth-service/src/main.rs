use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};

mod api;
mod catalog;
mod collaborator;
mod config;
mod context;
mod error;
mod gemini;
mod i18n;
mod parser;
mod prompts;
mod service;
mod session;
mod transcript;
mod wizard;

use crate::api::AppState;
use crate::gemini::GeminiClient;
use crate::service::CopilotService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging();

    info!(
        "Starting GroundTruth Copilot service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = config::load_config()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        dist_dir = %config.assets.dist_dir.display(),
        model = %config.collaborator.model,
        "Configuration loaded"
    );

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
            None
        }
    };

    // Initialize the collaborator and the session service
    let gemini = Arc::new(GeminiClient::new(&config.collaborator)?);
    let service = Arc::new(CopilotService::new(gemini, config.session.clone()));

    // Start idle session cleanup background task
    let cleanup_service = service.clone();
    let cleanup_interval = config.session.cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            let removed = cleanup_service.cleanup_idle_sessions();
            if removed > 0 {
                info!(
                    removed,
                    remaining = cleanup_service.session_count(),
                    "Evicted idle sessions"
                );
            }
        }
    });

    // Build the router
    let state = Arc::new(AppState::new(
        service,
        config.collaborator.api_key,
        metrics,
    ));
    let app = api::router(state, &config.assets);

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("GroundTruth Copilot listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("groundtruth_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
