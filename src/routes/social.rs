use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::SocialStore;
use crate::errors::AppError;
use crate::services::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInterestPayload {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInterestPayload {
    name: String,
    is_active: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPayload {
    url: String,
    interest_id: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    id: i32,
    source_url: String,
}

// ---- Interests ------------------------------------------------------------

#[instrument(skip(state))]
pub async fn list_interests(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let interests = state.repository.get_all_social_interests().await?;
    Ok(Json(interests))
}

#[instrument(skip(state, payload))]
pub async fn add_interest(
    State(state): State<AppState>,
    Json(payload): Json<NewInterestPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::MissingField("name".to_string()));
    }

    let interest = state.repository.add_social_interest(name).await?;
    Ok((StatusCode::CREATED, Json(interest)))
}

#[instrument(skip(state, payload))]
pub async fn update_interest(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateInterestPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::MissingField("name".to_string()));
    }

    let interest = state
        .repository
        .update_social_interest(id, name, payload.is_active)
        .await?;
    Ok(Json(interest))
}

#[instrument(skip(state))]
pub async fn delete_interest(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.repository.delete_social_interest(id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound {
            resource_type: "social interest".into(),
            resource_id: id.to_string(),
        });
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---- Articles -------------------------------------------------------------

/// Submit a URL for extraction and storage under an interest.
#[instrument(skip(state, payload))]
pub async fn submit_url(
    State(state): State<AppState>,
    Json(payload): Json<SubmitPayload>,
) -> Result<impl IntoResponse, AppError> {
    let id = state
        .social
        .submit(payload.interest_id, &payload.url)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id,
            source_url: payload.url.trim().to_string(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_dates(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let dates = state.repository.social_article_dates().await?;
    Ok(Json(dates))
}

#[instrument(skip(state))]
pub async fn articles_by_date(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<impl IntoResponse, AppError> {
    let articles = state.repository.social_articles_by_date(date).await?;
    Ok(Json(articles))
}

#[instrument(skip(state))]
pub async fn article_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let article = state
        .repository
        .social_article_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "social article".into(),
            resource_id: id.to_string(),
        })?;
    Ok(Json(article))
}

/// Generate (or fetch the cached) summary for a social article.
#[instrument(skip(state))]
pub async fn summarize_article(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.social.summary_for(id).await?;
    Ok(Json(summary))
}

#[instrument(skip(state))]
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.repository.delete_social_article(id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound {
            resource_type: "social article".into(),
            resource_id: id.to_string(),
        });
    }
    Ok(StatusCode::NO_CONTENT)
}
