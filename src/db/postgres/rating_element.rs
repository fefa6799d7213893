use std::collections::HashSet;

use sqlx::PgPool;

use crate::{
    errors::AppError,
    models::{NewRatingElement, RatingElement, RatingElementChanges},
};

const COLUMNS: &str = "id, element_type, score, comment, created_at, updated_at";

fn not_found() -> AppError {
    AppError::NotFound("Rating element not found".into())
}

pub async fn list_rating_elements(postgres: &PgPool) -> Result<Vec<RatingElement>, AppError> {
    sqlx::query_as::<_, RatingElement>(&format!(
        "SELECT {COLUMNS} FROM rating_elements ORDER BY id"
    ))
    .fetch_all(postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to list rating elements: {}", e)))
}

pub async fn get_rating_element(postgres: &PgPool, id: i64) -> Result<RatingElement, AppError> {
    sqlx::query_as::<_, RatingElement>(&format!(
        "SELECT {COLUMNS} FROM rating_elements WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to fetch rating element: {}", e)))?
    .ok_or_else(not_found)
}

pub async fn create_rating_element(
    postgres: &PgPool,
    new: NewRatingElement,
) -> Result<RatingElement, AppError> {
    sqlx::query_as::<_, RatingElement>(&format!(
        "INSERT INTO rating_elements (element_type, score, comment)
        VALUES ($1, $2, $3)
        RETURNING {COLUMNS}"
    ))
    .bind(&new.element_type)
    .bind(new.score)
    .bind(&new.comment)
    .fetch_one(postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to create rating element: {}", e)))
}

pub async fn update_rating_element(
    postgres: &PgPool,
    id: i64,
    changes: RatingElementChanges,
) -> Result<RatingElement, AppError> {
    let mut tx = postgres
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to open transaction: {}", e)))?;

    let mut element = sqlx::query_as::<_, RatingElement>(&format!(
        "SELECT {COLUMNS} FROM rating_elements WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to fetch rating element: {}", e)))?
    .ok_or_else(not_found)?;

    changes.apply(&mut element);

    let element = sqlx::query_as::<_, RatingElement>(&format!(
        "UPDATE rating_elements
        SET element_type = $2, score = $3, comment = $4, updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(&element.element_type)
    .bind(element.score)
    .bind(&element.comment)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to update rating element: {}", e)))?;

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to commit transaction: {}", e)))?;

    Ok(element)
}

/// Junction rows go with the element through `ON DELETE CASCADE`.
pub async fn delete_rating_element(postgres: &PgPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM rating_elements WHERE id = $1")
        .bind(id)
        .execute(postgres)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to delete rating element: {}", e)))?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }

    Ok(())
}

pub async fn missing_rating_elements(postgres: &PgPool, ids: &[i64]) -> Result<Vec<i64>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT id FROM rating_elements WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(postgres)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to check rating elements: {}", e)))?
            .into_iter()
            .collect();

    Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
}
