use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::double_option;

pub const COMMENT_MAX_LENGTH: usize = 512;

/// An atomic scored and/or commented rating unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RatingElement {
    pub id: i64,
    pub element_type: String,
    pub score: Option<i16>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST`, `PUT` and `PATCH`.
///
/// Values stay raw JSON until validated so a wrong type is reported under its
/// field. `None` is a missing key, `Some(None)` an explicit `null`.
#[derive(Debug, Default, Deserialize)]
pub struct RatingElementPayload {
    #[serde(default, deserialize_with = "double_option")]
    pub element_type: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub score: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub comment: Option<Option<Value>>,
}

/// A validated element ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRatingElement {
    pub element_type: String,
    pub score: Option<i16>,
    pub comment: Option<String>,
}

/// Validated changes; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingElementChanges {
    pub element_type: Option<String>,
    pub score: Option<Option<i16>>,
    pub comment: Option<Option<String>>,
}

impl RatingElementChanges {
    pub fn apply(self, element: &mut RatingElement) {
        if let Some(element_type) = self.element_type {
            element.element_type = element_type;
        }
        if let Some(score) = self.score {
            element.score = score;
        }
        if let Some(comment) = self.comment {
            element.comment = comment;
        }
    }
}
