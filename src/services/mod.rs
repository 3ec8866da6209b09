//! Service layer
//!
//! Pipelines composed from the store traits and provider adapters. Routes
//! stay thin; everything with a decision in it lives here.

pub mod generation;
pub mod social;
pub mod speech;

pub use generation::GenerationService;
pub use social::SocialService;
pub use speech::SpeechService;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Repository;

/// Shared application state, cloned per request by axum.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: Arc<Repository>,
    pub generation: Arc<GenerationService>,
    pub speech: Arc<SpeechService>,
    pub social: Arc<SocialService>,
}
