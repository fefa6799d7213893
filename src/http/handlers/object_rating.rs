use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    auth::AuthUser,
    errors::AppError,
    http::{JsonBody, handlers::ApiError},
    models::{ObjectRating, ObjectRatingChanges, ObjectRatingPayload},
    state::AppState,
    validation::ObjectRatingValidator,
};

fn validator(state: &AppState) -> ObjectRatingValidator<'_> {
    ObjectRatingValidator {
        values: &state.rating_values,
        content_types: &state.content_types,
        store: state.store.as_ref(),
    }
}

pub async fn list_object_ratings_handler(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<ObjectRating>>, ApiError> {
    let ratings = state.store.list_object_ratings().await.map_err(|e| {
        tracing::error!("Error listing object ratings: {}", e);
        e.to_response()
    })?;

    Ok(Json(ratings))
}

/// The owner is always the caller; the payload type has no way to name another user.
pub async fn create_object_rating_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<ObjectRatingPayload>,
) -> Result<(StatusCode, Json<ObjectRating>), ApiError> {
    let fields = validator(&state).fields(payload).await.map_err(|e| {
        tracing::info!("Rejected object rating from user {}: {}", user.id, e);
        e.to_response()
    })?;

    let rating = state
        .store
        .create_object_rating(fields.owned_by(user.id))
        .await
        .map_err(|e| {
            tracing::error!("Error creating object rating: {}", e);
            e.to_response()
        })?;

    tracing::info!(
        "Object rating {} on {}:{} created by user {}",
        rating.id,
        rating.content_type,
        rating.object_id,
        user.id
    );
    Ok((StatusCode::CREATED, Json(rating)))
}

pub async fn get_object_rating_handler(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ObjectRating>, ApiError> {
    let rating = state.store.get_object_rating(id).await.map_err(|e| {
        tracing::warn!("Error retrieving object rating {}: {}", id, e);
        e.to_response()
    })?;

    Ok(Json(rating))
}

pub async fn put_object_rating_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<ObjectRatingPayload>,
) -> Result<Json<ObjectRating>, ApiError> {
    let changes = validator(&state)
        .fields(payload)
        .await
        .map(ObjectRatingChanges::from)
        .map_err(|e| {
            tracing::info!("Rejected update of object rating {}: {}", id, e);
            e.to_response()
        })?;

    update_object_rating(state, user.id, id, changes).await
}

pub async fn patch_object_rating_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<ObjectRatingPayload>,
) -> Result<Json<ObjectRating>, ApiError> {
    let changes = validator(&state).changes(payload).await.map_err(|e| {
        tracing::info!("Rejected update of object rating {}: {}", id, e);
        e.to_response()
    })?;

    update_object_rating(state, user.id, id, changes).await
}

async fn update_object_rating(
    state: AppState,
    user_id: i64,
    id: i64,
    changes: ObjectRatingChanges,
) -> Result<Json<ObjectRating>, ApiError> {
    let rating = state
        .store
        .update_object_rating(id, changes)
        .await
        .map_err(|e| {
            tracing::warn!("Error updating object rating {}: {}", id, e);
            e.to_response()
        })?;

    tracing::info!("Object rating {} updated by user {}", id, user_id);
    Ok(Json(rating))
}

pub async fn delete_object_rating_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_object_rating(id).await.map_err(|e| {
        tracing::warn!("Error deleting object rating {}: {}", id, e);
        e.to_response()
    })?;

    tracing::info!("Object rating {} deleted by user {}", id, user.id);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct RatingTarget {
    pub content_type: String,
    pub object_id: i64,
    pub object: Value,
}

pub async fn get_object_rating_target_handler(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<RatingTarget>, ApiError> {
    let rating = state.store.get_object_rating(id).await.map_err(|e| {
        tracing::warn!("Error retrieving object rating {}: {}", id, e);
        e.to_response()
    })?;

    let object = state
        .content_types
        .resolve(&rating.content_type, rating.object_id, state.store.clone())
        .await
        .map_err(|e| {
            tracing::error!("Error resolving target of object rating {}: {}", id, e);
            e.to_response()
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "{} {} not found",
                rating.content_type, rating.object_id
            ))
            .to_response()
        })?;

    Ok(Json(RatingTarget {
        content_type: rating.content_type,
        object_id: rating.object_id,
        object,
    }))
}
