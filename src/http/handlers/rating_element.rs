use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    auth::AuthUser,
    http::{JsonBody, handlers::ApiError},
    models::{RatingElement, RatingElementChanges, RatingElementPayload},
    state::AppState,
    validation::{rating_element_changes, rating_element_fields},
};

pub async fn list_rating_elements_handler(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<RatingElement>>, ApiError> {
    let elements = state.store.list_rating_elements().await.map_err(|e| {
        tracing::error!("Error listing rating elements: {}", e);
        e.to_response()
    })?;

    Ok(Json(elements))
}

pub async fn create_rating_element_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<RatingElementPayload>,
) -> Result<(StatusCode, Json<RatingElement>), ApiError> {
    let new = rating_element_fields(payload, &state.rating_values).map_err(|e| {
        tracing::info!("Rejected rating element from user {}: {}", user.id, e);
        e.to_response()
    })?;

    let element = state.store.create_rating_element(new).await.map_err(|e| {
        tracing::error!("Error creating rating element: {}", e);
        e.to_response()
    })?;

    tracing::info!("Rating element {} created by user {}", element.id, user.id);
    Ok((StatusCode::CREATED, Json(element)))
}

pub async fn get_rating_element_handler(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<RatingElement>, ApiError> {
    let element = state.store.get_rating_element(id).await.map_err(|e| {
        tracing::warn!("Error retrieving rating element {}: {}", id, e);
        e.to_response()
    })?;

    Ok(Json(element))
}

pub async fn put_rating_element_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<RatingElementPayload>,
) -> Result<Json<RatingElement>, ApiError> {
    let changes = rating_element_changes(payload, &state.rating_values, true).map_err(|e| {
        tracing::info!("Rejected update of rating element {}: {}", id, e);
        e.to_response()
    })?;

    update_rating_element(state, user.id, id, changes).await
}

pub async fn patch_rating_element_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<RatingElementPayload>,
) -> Result<Json<RatingElement>, ApiError> {
    let changes = rating_element_changes(payload, &state.rating_values, false).map_err(|e| {
        tracing::info!("Rejected update of rating element {}: {}", id, e);
        e.to_response()
    })?;

    update_rating_element(state, user.id, id, changes).await
}

async fn update_rating_element(
    state: AppState,
    user_id: i64,
    id: i64,
    changes: RatingElementChanges,
) -> Result<Json<RatingElement>, ApiError> {
    let element = state
        .store
        .update_rating_element(id, changes)
        .await
        .map_err(|e| {
            tracing::warn!("Error updating rating element {}: {}", id, e);
            e.to_response()
        })?;

    tracing::info!("Rating element {} updated by user {}", id, user_id);
    Ok(Json(element))
}

pub async fn delete_rating_element_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_rating_element(id).await.map_err(|e| {
        tracing::warn!("Error deleting rating element {}: {}", id, e);
        e.to_response()
    })?;

    tracing::info!("Rating element {} deleted by user {}", id, user.id);
    Ok(StatusCode::NO_CONTENT)
}
