pub mod articles;
pub mod generate;
pub mod health;
pub mod social;
pub mod topics;

use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::metrics;
use crate::services::AppState;

pub fn create_router(state: AppState) -> Router {
    let (prometheus_layer, metrics_router) = metrics::setup_metrics();

    // Synthesized audio is served straight from disk
    let audio_dir = state.config.speech.audio_dir.clone();

    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/topics",
            get(topics::list_topics).post(topics::add_topic),
        )
        .route(
            "/topics/{id}",
            put(topics::update_topic).delete(topics::delete_topic),
        )
        .route("/articles/dates", get(articles::list_dates))
        .route("/articles/detail/{id}", get(articles::article_detail))
        .route("/articles/tts/{id}", post(articles::synthesize_audio))
        .route("/articles/{date}", get(articles::articles_by_date))
        .nest_service("/articles/audio", ServeDir::new(audio_dir))
        .route("/generate", post(generate::run_generation))
        .route(
            "/social/interests",
            get(social::list_interests).post(social::add_interest),
        )
        .route(
            "/social/interests/{id}",
            put(social::update_interest).delete(social::delete_interest),
        )
        .route("/social/submit", post(social::submit_url))
        .route("/social/dates", get(social::list_dates))
        .route("/social/articles/{date}", get(social::articles_by_date))
        .route(
            "/social/article/{id}",
            get(social::article_detail).delete(social::delete_article),
        )
        .route(
            "/social/article/{id}/summary",
            post(social::summarize_article),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(metrics_router)
        .layer(
            ServiceBuilder::new()
                // Prometheus metrics (outermost - captures all requests)
                .layer(prometheus_layer)
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
