use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    db::{RatingStore, username_taken},
    errors::AppError,
    models::{
        NewObjectRating, NewRatingElement, ObjectRating, ObjectRatingChanges, RatingElement,
        RatingElementChanges, User, object_rating::dedup_elements,
    },
    validation::element_does_not_exist,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    rating_elements: BTreeMap<i64, RatingElement>,
    object_ratings: BTreeMap<i64, ObjectRating>,
    last_user_id: i64,
    last_element_id: i64,
    last_rating_id: i64,
}

/// Process-local store used by the tests and by `STORE=memory` runs.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn element_not_found() -> AppError {
    AppError::NotFound("Rating element not found".into())
}

fn rating_not_found() -> AppError {
    AppError::NotFound("Object rating not found".into())
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn create_user(&self, username: &str) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;

        if tables.users.values().any(|u| u.username == username) {
            return Err(username_taken());
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: username.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<User, AppError> {
        let tables = self.tables.lock().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;

        if tables.users.remove(&id).is_none() {
            return Err(AppError::NotFound("User not found".into()));
        }

        let before = tables.object_ratings.len();
        tables.object_ratings.retain(|_, rating| rating.user != id);
        tracing::debug!(
            "Removed {} object rating(s) owned by user {}",
            before - tables.object_ratings.len(),
            id
        );

        Ok(())
    }

    async fn list_rating_elements(&self) -> Result<Vec<RatingElement>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.rating_elements.values().cloned().collect())
    }

    async fn get_rating_element(&self, id: i64) -> Result<RatingElement, AppError> {
        let tables = self.tables.lock().await;
        tables
            .rating_elements
            .get(&id)
            .cloned()
            .ok_or_else(element_not_found)
    }

    async fn create_rating_element(&self, new: NewRatingElement) -> Result<RatingElement, AppError> {
        let mut tables = self.tables.lock().await;

        tables.last_element_id += 1;
        let now = Utc::now();
        let element = RatingElement {
            id: tables.last_element_id,
            element_type: new.element_type,
            score: new.score,
            comment: new.comment,
            created_at: now,
            updated_at: now,
        };
        tables.rating_elements.insert(element.id, element.clone());

        Ok(element)
    }

    async fn update_rating_element(
        &self,
        id: i64,
        changes: RatingElementChanges,
    ) -> Result<RatingElement, AppError> {
        let mut tables = self.tables.lock().await;
        let element = tables
            .rating_elements
            .get_mut(&id)
            .ok_or_else(element_not_found)?;

        changes.apply(element);
        element.updated_at = Utc::now();

        Ok(element.clone())
    }

    async fn delete_rating_element(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;

        if tables.rating_elements.remove(&id).is_none() {
            return Err(element_not_found());
        }

        for rating in tables.object_ratings.values_mut() {
            rating.elements.retain(|element_id| *element_id != id);
        }

        Ok(())
    }

    async fn missing_rating_elements(&self, ids: &[i64]) -> Result<Vec<i64>, AppError> {
        let tables = self.tables.lock().await;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| !tables.rating_elements.contains_key(id))
            .collect())
    }

    async fn list_object_ratings(&self) -> Result<Vec<ObjectRating>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.object_ratings.values().cloned().collect())
    }

    async fn get_object_rating(&self, id: i64) -> Result<ObjectRating, AppError> {
        let tables = self.tables.lock().await;
        tables
            .object_ratings
            .get(&id)
            .cloned()
            .ok_or_else(rating_not_found)
    }

    async fn create_object_rating(&self, new: NewObjectRating) -> Result<ObjectRating, AppError> {
        let mut tables = self.tables.lock().await;

        if !tables.users.contains_key(&new.user) {
            return Err(AppError::NotFound("User not found".into()));
        }

        let elements = dedup_elements(new.elements);
        if let Some(missing) = elements
            .iter()
            .find(|id| !tables.rating_elements.contains_key(*id))
        {
            return Err(AppError::field("elements", element_does_not_exist(*missing)));
        }

        tables.last_rating_id += 1;
        let now = Utc::now();
        let rating = ObjectRating {
            id: tables.last_rating_id,
            user: new.user,
            user_type: new.user_type,
            content_type: new.content_type,
            object_id: new.object_id,
            elements,
            created_at: now,
            updated_at: now,
        };
        tables.object_ratings.insert(rating.id, rating.clone());

        Ok(rating)
    }

    async fn update_object_rating(
        &self,
        id: i64,
        changes: ObjectRatingChanges,
    ) -> Result<ObjectRating, AppError> {
        let mut tables = self.tables.lock().await;

        let elements = changes.elements.clone().map(dedup_elements);
        if let Some(missing) = elements
            .iter()
            .flatten()
            .find(|id| !tables.rating_elements.contains_key(*id))
        {
            return Err(AppError::field("elements", element_does_not_exist(*missing)));
        }

        let rating = tables
            .object_ratings
            .get_mut(&id)
            .ok_or_else(rating_not_found)?;

        changes.apply_fields(rating);
        if let Some(elements) = elements {
            rating.elements = elements;
        }
        rating.updated_at = Utc::now();

        Ok(rating.clone())
    }

    async fn delete_object_rating(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        tables
            .object_ratings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(rating_not_found)
    }
}
