use sqlx::PgPool;

use crate::{db::username_taken, errors::AppError, models::User};

pub async fn create_user(postgres: &PgPool, username: &str) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username)
        VALUES ($1)
        ON CONFLICT (username) DO NOTHING
        RETURNING id, username, created_at",
    )
    .bind(username)
    .fetch_optional(postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to create user: {}", e)))?;

    let user = user.ok_or_else(username_taken)?;
    tracing::info!("Created user {} (ID: {})", user.username, user.id);

    Ok(user)
}

pub async fn get_user(postgres: &PgPool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT id, username, created_at FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(postgres)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch user: {}", e)))?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Owned object ratings go with the user through `ON DELETE CASCADE`.
pub async fn delete_user(postgres: &PgPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(postgres)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to delete user: {}", e)))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(())
}
