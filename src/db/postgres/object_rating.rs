use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    errors::AppError,
    models::{
        NewObjectRating, ObjectRating, ObjectRatingChanges, object_rating::ObjectRatingRow,
        object_rating::dedup_elements,
    },
    validation::element_does_not_exist,
};

const COLUMNS: &str = "id, user_id, user_type, content_type, object_id, created_at, updated_at";

fn not_found() -> AppError {
    AppError::NotFound("Object rating not found".into())
}

/// Element ids per rating, each list in attach order.
async fn element_ids_for<'e, E>(executor: E, rating_ids: &[i64]) -> Result<HashMap<i64, Vec<i64>>, AppError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let links = sqlx::query_as::<_, (i64, i64)>(
        "SELECT object_rating_id, rating_element_id
        FROM object_rating_elements
        WHERE object_rating_id = ANY($1)
        ORDER BY id",
    )
    .bind(rating_ids)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to fetch rating elements: {}", e)))?;

    let mut by_rating: HashMap<i64, Vec<i64>> = HashMap::new();
    for (rating_id, element_id) in links {
        by_rating.entry(rating_id).or_default().push(element_id);
    }

    Ok(by_rating)
}

async fn replace_elements(
    tx: &mut Transaction<'_, Postgres>,
    rating_id: i64,
    elements: &[i64],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM object_rating_elements WHERE object_rating_id = $1")
        .bind(rating_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to clear rating elements: {}", e)))?;

    // one row per element so the serial id records the given order
    for element_id in elements {
        sqlx::query(
            "INSERT INTO object_rating_elements (object_rating_id, rating_element_id)
            VALUES ($1, $2)",
        )
        .bind(rating_id)
        .bind(element_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| match e.as_database_error() {
            // the element was deleted after the body was validated
            Some(db) if db.is_foreign_key_violation() => {
                AppError::field("elements", element_does_not_exist(*element_id))
            }
            _ => AppError::DatabaseError(format!("Failed to attach rating element: {}", e)),
        })?;
    }

    Ok(())
}

pub async fn list_object_ratings(postgres: &PgPool) -> Result<Vec<ObjectRating>, AppError> {
    let rows = sqlx::query_as::<_, ObjectRatingRow>(&format!(
        "SELECT {COLUMNS} FROM object_ratings ORDER BY id"
    ))
    .fetch_all(postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to list object ratings: {}", e)))?;

    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut elements = element_ids_for(postgres, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let ids = elements.remove(&row.id).unwrap_or_default();
            row.with_elements(ids)
        })
        .collect())
}

pub async fn get_object_rating(postgres: &PgPool, id: i64) -> Result<ObjectRating, AppError> {
    let row = sqlx::query_as::<_, ObjectRatingRow>(&format!(
        "SELECT {COLUMNS} FROM object_ratings WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to fetch object rating: {}", e)))?
    .ok_or_else(not_found)?;

    let mut elements = element_ids_for(postgres, &[id]).await?;
    Ok(row.with_elements(elements.remove(&id).unwrap_or_default()))
}

pub async fn create_object_rating(
    postgres: &PgPool,
    new: NewObjectRating,
) -> Result<ObjectRating, AppError> {
    let elements = dedup_elements(new.elements);

    let mut tx = postgres
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to open transaction: {}", e)))?;

    let row = sqlx::query_as::<_, ObjectRatingRow>(&format!(
        "INSERT INTO object_ratings (user_id, user_type, content_type, object_id)
        VALUES ($1, $2, $3, $4)
        RETURNING {COLUMNS}"
    ))
    .bind(new.user)
    .bind(&new.user_type)
    .bind(&new.content_type)
    .bind(new.object_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to create object rating: {}", e)))?;

    replace_elements(&mut tx, row.id, &elements).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to commit transaction: {}", e)))?;

    tracing::info!(
        "Created object rating {} for {}:{} by user {}",
        row.id,
        row.content_type,
        row.object_id,
        row.user_id
    );

    Ok(row.with_elements(elements))
}

pub async fn update_object_rating(
    postgres: &PgPool,
    id: i64,
    changes: ObjectRatingChanges,
) -> Result<ObjectRating, AppError> {
    let mut tx = postgres
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to open transaction: {}", e)))?;

    let row = sqlx::query_as::<_, ObjectRatingRow>(&format!(
        "SELECT {COLUMNS} FROM object_ratings WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to fetch object rating: {}", e)))?
    .ok_or_else(not_found)?;

    let mut rating = row.with_elements(Vec::new());
    changes.apply_fields(&mut rating);

    let row = sqlx::query_as::<_, ObjectRatingRow>(&format!(
        "UPDATE object_ratings
        SET user_type = $2, content_type = $3, object_id = $4, updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(&rating.user_type)
    .bind(&rating.content_type)
    .bind(rating.object_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to update object rating: {}", e)))?;

    if let Some(elements) = changes.elements {
        replace_elements(&mut tx, id, &dedup_elements(elements)).await?;
    }

    let mut elements = element_ids_for(&mut *tx, &[id]).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to commit transaction: {}", e)))?;

    Ok(row.with_elements(elements.remove(&id).unwrap_or_default()))
}

pub async fn delete_object_rating(postgres: &PgPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM object_ratings WHERE id = $1")
        .bind(id)
        .execute(postgres)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to delete object rating: {}", e)))?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }

    Ok(())
}
