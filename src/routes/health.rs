use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::errors::AppError;
use crate::services::AppState;

/// Liveness plus a database round trip.
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.repository.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
