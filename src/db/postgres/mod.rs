mod object_rating;
mod rating_element;
mod user;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::RatingStore,
    errors::AppError,
    models::{
        NewObjectRating, NewRatingElement, ObjectRating, ObjectRatingChanges, RatingElement,
        RatingElementChanges, User,
    },
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, run_migrations: bool) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to Postgres: {}", e)))?;

        if run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;
            tracing::info!("Database migrations applied");
        }

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RatingStore for PgStore {
    async fn create_user(&self, username: &str) -> Result<User, AppError> {
        user::create_user(&self.pool, username).await
    }

    async fn get_user(&self, id: i64) -> Result<User, AppError> {
        user::get_user(&self.pool, id).await
    }

    async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        user::delete_user(&self.pool, id).await
    }

    async fn list_rating_elements(&self) -> Result<Vec<RatingElement>, AppError> {
        rating_element::list_rating_elements(&self.pool).await
    }

    async fn get_rating_element(&self, id: i64) -> Result<RatingElement, AppError> {
        rating_element::get_rating_element(&self.pool, id).await
    }

    async fn create_rating_element(&self, new: NewRatingElement) -> Result<RatingElement, AppError> {
        rating_element::create_rating_element(&self.pool, new).await
    }

    async fn update_rating_element(
        &self,
        id: i64,
        changes: RatingElementChanges,
    ) -> Result<RatingElement, AppError> {
        rating_element::update_rating_element(&self.pool, id, changes).await
    }

    async fn delete_rating_element(&self, id: i64) -> Result<(), AppError> {
        rating_element::delete_rating_element(&self.pool, id).await
    }

    async fn missing_rating_elements(&self, ids: &[i64]) -> Result<Vec<i64>, AppError> {
        rating_element::missing_rating_elements(&self.pool, ids).await
    }

    async fn list_object_ratings(&self) -> Result<Vec<ObjectRating>, AppError> {
        object_rating::list_object_ratings(&self.pool).await
    }

    async fn get_object_rating(&self, id: i64) -> Result<ObjectRating, AppError> {
        object_rating::get_object_rating(&self.pool, id).await
    }

    async fn create_object_rating(&self, new: NewObjectRating) -> Result<ObjectRating, AppError> {
        object_rating::create_object_rating(&self.pool, new).await
    }

    async fn update_object_rating(
        &self,
        id: i64,
        changes: ObjectRatingChanges,
    ) -> Result<ObjectRating, AppError> {
        object_rating::update_object_rating(&self.pool, id, changes).await
    }

    async fn delete_object_rating(&self, id: i64) -> Result<(), AppError> {
        object_rating::delete_object_rating(&self.pool, id).await
    }
}
