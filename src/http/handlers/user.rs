use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{AuthUser, generate_jwt},
    errors::AppError,
    http::{JsonBody, handlers::ApiError},
    models::User,
    state::AppState,
    validation::REQUIRED,
};

#[derive(Deserialize)]
pub struct CreateUserPayload {
    pub username: Option<String>,
}

#[derive(Serialize)]
pub struct CreatedUser {
    pub user: User,
    pub token: String,
}

fn is_valid_username(username: &str) -> bool {
    let len_ok = (1..=150).contains(&username.chars().count());
    let valid_chars = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));

    len_ok && valid_chars
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserPayload>,
) -> Result<(StatusCode, Json<CreatedUser>), ApiError> {
    let username = match payload.username.as_deref().map(str::trim) {
        None => return Err(AppError::field("username", REQUIRED).to_response()),
        Some(name) if !is_valid_username(name) => {
            return Err(AppError::field(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            )
            .to_response());
        }
        Some(name) => name,
    };

    let user = state.store.create_user(username).await.map_err(|e| {
        tracing::error!("Error creating user: {}", e);
        e.to_response()
    })?;

    let token = generate_jwt(&user, &state.jwt_secret).map_err(|e| {
        tracing::error!("Error issuing token for user {}: {}", user.id, e);
        e.to_response()
    })?;

    tracing::info!("User created: {} (ID: {})", user.username, user.id);
    Ok((StatusCode::CREATED, Json(CreatedUser { user, token })))
}

pub async fn get_current_user_handler(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

/// Deletes the caller and, with it, every object rating the caller owns.
pub async fn delete_current_user_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    state.store.delete_user(user.id).await.map_err(|e| {
        tracing::error!("Error deleting user {}: {}", user.id, e);
        e.to_response()
    })?;

    tracing::info!("User {} deleted", user.id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_username() {
        // Valid cases
        assert!(is_valid_username("user_1@test.com"));
        assert!(is_valid_username("a"));
        assert!(is_valid_username("first.last+tag-x"));

        // Invalid cases
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("semi;colon"));
        assert!(!is_valid_username(&"x".repeat(151)));
    }
}
