use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTopicPayload {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopicPayload {
    name: String,
    is_active: bool,
}

#[instrument(skip(state))]
pub async fn list_topics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let topics = state.repository.get_all_topics().await?;
    Ok(Json(topics))
}

#[instrument(skip(state, payload))]
pub async fn add_topic(
    State(state): State<AppState>,
    Json(payload): Json<NewTopicPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::MissingField("name".to_string()));
    }

    let topic = state.repository.add_topic(name).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

#[instrument(skip(state, payload))]
pub async fn update_topic(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTopicPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::MissingField("name".to_string()));
    }

    let topic = state
        .repository
        .update_topic(id, name, payload.is_active)
        .await?;
    Ok(Json(topic))
}

#[instrument(skip(state))]
pub async fn delete_topic(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.repository.delete_topic(id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound {
            resource_type: "topic".into(),
            resource_id: id.to_string(),
        });
    }
    Ok(StatusCode::NO_CONTENT)
}
