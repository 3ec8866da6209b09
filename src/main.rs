mod config;
mod db;
mod errors;
mod extraction;
mod metrics;
mod providers;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::extraction::{AiExtractStrategy, ExtractionChain, HtmlScrapeStrategy, ReaderProxyStrategy};
use crate::providers::{ClaudeGenerator, ElevenLabsSpeech, GeminiGenerator, GoogleSearch};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    dotenvy::dotenv().ok();
    let config = config::AppConfig::build().expect("Failed to load configuration");

    // 2. Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.rust_log))
        .init();

    tracing::info!("Starting dailybrief...");

    // 3. Initialize database and schema
    let repository = Arc::new(db::Repository::new(&config.database).await?);
    repository.init_schema().await?;
    tracing::info!("Connected to database");

    // 4. Initialize provider adapters
    let search: Arc<dyn providers::SearchProvider> = Arc::new(GoogleSearch::new(config.search.clone()));
    let generator: Arc<dyn providers::GenerationProvider> = match config.generation.provider.as_str() {
        "claude" => Arc::new(ClaudeGenerator::new(config.generation.anthropic_api_key.clone())),
        _ => Arc::new(GeminiGenerator::new(config.generation.gemini_api_key.clone())),
    };
    let speech: Arc<dyn providers::SpeechProvider> = Arc::new(ElevenLabsSpeech::new(config.speech.clone()));
    tracing::info!(provider = %config.generation.provider, "Generation provider selected");

    // 5. Extraction chain: HTML scrape, reader proxy, AI as last resort
    let chain = Arc::new(ExtractionChain::new(vec![
        Arc::new(HtmlScrapeStrategy::new()),
        Arc::new(ReaderProxyStrategy::new()),
        Arc::new(AiExtractStrategy::new(generator.clone())),
    ]));

    // 6. Initialize services and app state
    let generation = Arc::new(services::GenerationService::new(
        repository.clone(),
        search,
        generator.clone(),
        Duration::from_secs(config.generation.timeout_secs),
    ));
    let speech_service = Arc::new(services::SpeechService::new(
        repository.clone(),
        speech,
        config.speech.audio_dir.clone(),
    ));
    let social = Arc::new(services::SocialService::new(
        repository.clone(),
        chain,
        generator,
    ));
    let state = services::AppState {
        config: Arc::new(config.clone()),
        repository,
        generation,
        speech: speech_service,
        social,
    };

    // 7. Setup router
    let app = routes::create_router(state);

    // 8. Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
