use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::AppState;

#[instrument(skip(state))]
pub async fn list_dates(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let dates = state.repository.article_dates().await?;
    Ok(Json(dates))
}

#[instrument(skip(state))]
pub async fn articles_by_date(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<impl IntoResponse, AppError> {
    let articles = state.repository.articles_by_date(date).await?;
    Ok(Json(articles))
}

#[instrument(skip(state))]
pub async fn article_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let article = state
        .repository
        .article_with_topic(id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "article".into(),
            resource_id: id.to_string(),
        })?;
    Ok(Json(article))
}

/// Trigger (or fetch the cached result of) speech synthesis for an article.
#[instrument(skip(state))]
pub async fn synthesize_audio(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let audio = state.speech.audio_for_article(id).await?;
    Ok(Json(audio))
}
