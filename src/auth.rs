use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use headers::{Authorization, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::Value;

use crate::{
    errors::AppError,
    models::{User, user::Claims},
    state::AppState,
};

/// The authenticated caller, resolved from the bearer token to a stored user.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::Unauthorized("Authentication credentials were not provided.".into())
                        .to_response()
                })?;

        let claims = decode_jwt(bearer.token(), &state.jwt_secret).map_err(|e| {
            tracing::warn!("Rejected bearer token: {}", e);
            e.to_response()
        })?;

        let user_id = claims.sub.parse::<i64>().map_err(|_| {
            AppError::Unauthorized("Invalid user ID in token".into()).to_response()
        })?;

        match state.store.get_user(user_id).await {
            Ok(user) => Ok(AuthUser(user)),
            Err(AppError::NotFound(_)) => {
                Err(AppError::Unauthorized("User not found".into()).to_response())
            }
            Err(e) => {
                tracing::error!("Error loading authenticated user {}: {}", user_id, e);
                Err(e.to_response())
            }
        }
    }
}

pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(token_data.claims)
}

pub fn generate_jwt(user: &User, secret: &str) -> Result<String, AppError> {
    let expiration = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(AppError::JwtError)
}
