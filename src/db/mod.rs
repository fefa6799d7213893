pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    errors::AppError,
    models::{
        NewObjectRating, NewRatingElement, ObjectRating, ObjectRatingChanges, RatingElement,
        RatingElementChanges, User,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence for users, rating elements and object ratings.
///
/// Every method is one atomic unit of work. Lookups of a missing id return
/// `AppError::NotFound`. Lists are ordered by ascending id and an object
/// rating's `elements` keep the order they were attached in.
#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn create_user(&self, username: &str) -> Result<User, AppError>;
    async fn get_user(&self, id: i64) -> Result<User, AppError>;
    /// Removes the user together with the object ratings it owns.
    async fn delete_user(&self, id: i64) -> Result<(), AppError>;

    async fn list_rating_elements(&self) -> Result<Vec<RatingElement>, AppError>;
    async fn get_rating_element(&self, id: i64) -> Result<RatingElement, AppError>;
    async fn create_rating_element(&self, new: NewRatingElement) -> Result<RatingElement, AppError>;
    async fn update_rating_element(
        &self,
        id: i64,
        changes: RatingElementChanges,
    ) -> Result<RatingElement, AppError>;
    /// Removes the element and detaches it from every object rating.
    async fn delete_rating_element(&self, id: i64) -> Result<(), AppError>;
    /// Returns the ids from `ids` that have no rating element, in input order.
    async fn missing_rating_elements(&self, ids: &[i64]) -> Result<Vec<i64>, AppError>;

    async fn list_object_ratings(&self) -> Result<Vec<ObjectRating>, AppError>;
    async fn get_object_rating(&self, id: i64) -> Result<ObjectRating, AppError>;
    async fn create_object_rating(&self, new: NewObjectRating) -> Result<ObjectRating, AppError>;
    async fn update_object_rating(
        &self,
        id: i64,
        changes: ObjectRatingChanges,
    ) -> Result<ObjectRating, AppError>;
    async fn delete_object_rating(&self, id: i64) -> Result<(), AppError>;
}

pub(crate) fn username_taken() -> AppError {
    AppError::field("username", "A user with that username already exists.")
}
