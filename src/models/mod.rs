pub mod object_rating;
pub mod rating_element;
pub mod user;

pub use object_rating::{
    NewObjectRating, ObjectRating, ObjectRatingChanges, ObjectRatingFields, ObjectRatingPayload,
};
pub use rating_element::{
    NewRatingElement, RatingElement, RatingElementChanges, RatingElementPayload,
};
pub use user::User;

use serde::{Deserialize, Deserializer};

/// Keeps an explicit `null` apart from a missing key: `None` is absent, `Some(None)` is null.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
