use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::double_option;

/// A user's rating of any target entity, referenced generically by
/// `(content_type, object_id)`, made of an ordered set of rating elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRating {
    pub id: i64,
    pub user: i64,
    pub user_type: String,
    pub content_type: String,
    pub object_id: i64,
    pub elements: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ObjectRatingRow {
    pub id: i64,
    pub user_id: i64,
    pub user_type: String,
    pub content_type: String,
    pub object_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ObjectRatingRow {
    pub fn with_elements(self, elements: Vec<i64>) -> ObjectRating {
        ObjectRating {
            id: self.id,
            user: self.user_id,
            user_type: self.user_type,
            content_type: self.content_type,
            object_id: self.object_id,
            elements,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Body of `POST`, `PUT` and `PATCH`.
///
/// No `user` field: the owner always comes from the bearer token and a
/// `user` key in the body is dropped during decoding. Values stay raw JSON
/// until validated, as in `RatingElementPayload`.
#[derive(Debug, Default, Deserialize)]
pub struct ObjectRatingPayload {
    #[serde(default, deserialize_with = "double_option")]
    pub user_type: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub content_type: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub object_id: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub elements: Option<Option<Value>>,
}

/// Every writable field, validated. Produced for `POST` and `PUT`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRatingFields {
    pub user_type: String,
    pub content_type: String,
    pub object_id: i64,
    pub elements: Vec<i64>,
}

impl ObjectRatingFields {
    pub fn owned_by(self, user: i64) -> NewObjectRating {
        NewObjectRating {
            user,
            user_type: self.user_type,
            content_type: self.content_type,
            object_id: self.object_id,
            elements: self.elements,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewObjectRating {
    pub user: i64,
    pub user_type: String,
    pub content_type: String,
    pub object_id: i64,
    pub elements: Vec<i64>,
}

/// Validated changes. `elements`, when present, replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRatingChanges {
    pub user_type: Option<String>,
    pub content_type: Option<String>,
    pub object_id: Option<i64>,
    pub elements: Option<Vec<i64>>,
}

impl From<ObjectRatingFields> for ObjectRatingChanges {
    fn from(fields: ObjectRatingFields) -> Self {
        Self {
            user_type: Some(fields.user_type),
            content_type: Some(fields.content_type),
            object_id: Some(fields.object_id),
            elements: Some(fields.elements),
        }
    }
}

impl ObjectRatingChanges {
    /// Applies the scalar fields. The element set is written separately by the store.
    pub fn apply_fields(&self, rating: &mut ObjectRating) {
        if let Some(user_type) = &self.user_type {
            rating.user_type = user_type.clone();
        }
        if let Some(content_type) = &self.content_type {
            rating.content_type = content_type.clone();
        }
        if let Some(object_id) = self.object_id {
            rating.object_id = object_id;
        }
    }
}

/// Drops repeated ids, keeping the first occurrence and the given order.
pub fn dedup_elements(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
