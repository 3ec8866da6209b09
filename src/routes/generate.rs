use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GeneratePayload {
    /// Defaults to today (UTC). Accepting a date makes backfills and
    /// repeatable tests possible; idempotency holds either way.
    date: Option<NaiveDate>,
}

/// Run the daily generation for every active topic and target language.
/// Always 200 with the per-pair breakdown; per-pair problems are reported,
/// not raised.
#[instrument(skip(state, payload))]
pub async fn run_generation(
    State(state): State<AppState>,
    payload: Result<Json<GeneratePayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // The body is optional; a missing or empty body means "today"
    let date = payload
        .ok()
        .and_then(|Json(p)| p.date)
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let report = state.generation.run(date).await?;
    Ok(Json(report))
}
