use serde_json::Value;

use crate::{
    config::RatingValues,
    content_types::ContentTypeRegistry,
    db::RatingStore,
    errors::{AppError, FieldErrors},
    models::{
        NewRatingElement, ObjectRatingChanges, ObjectRatingFields, ObjectRatingPayload,
        RatingElementChanges, RatingElementPayload, rating_element::COMMENT_MAX_LENGTH,
    },
};

pub const INVALID_ELEMENT_TYPE: &str = "Invalid element type.";
pub const INVALID_SCORE: &str = "Invalid score.";
pub const INVALID_USER_TYPE: &str = "Invalid user type.";
pub const INVALID_CONTENT_TYPE: &str = "Invalid content type.";
pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_AN_INTEGER: &str = "A valid integer is required.";

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn element_does_not_exist(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

pub fn expect_string<'a>(field: &'static str, value: &'a Value) -> Result<&'a str, ValidationError> {
    value
        .as_str()
        .ok_or_else(|| ValidationError::new(field, NOT_A_STRING))
}

/// Integral JSON numbers, including whole floats such as `5.0`.
pub fn expect_integer(field: &'static str, value: &Value) -> Result<i64, ValidationError> {
    let integer = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    };

    integer.ok_or_else(|| ValidationError::new(field, NOT_AN_INTEGER))
}

/// A list of primary keys. Only the first offending item is reported.
pub fn expect_pk_list(field: &'static str, value: &Value) -> Result<Vec<i64>, ValidationError> {
    let items = value.as_array().ok_or_else(|| {
        ValidationError::new(
            field,
            format!("Expected a list of items but got type \"{}\".", json_kind(value)),
        )
    })?;

    items
        .iter()
        .map(|item| {
            item.as_i64().ok_or_else(|| {
                ValidationError::new(
                    field,
                    format!("Incorrect type. Expected pk value, received {}.", json_kind(item)),
                )
            })
        })
        .collect()
}

pub fn validate_element_type<'a>(
    value: &'a str,
    values: &RatingValues,
) -> Result<&'a str, ValidationError> {
    if values.is_valid_element_type(value) {
        Ok(value)
    } else {
        Err(ValidationError::new("element_type", INVALID_ELEMENT_TYPE))
    }
}

/// A missing score is never checked against the bounds.
pub fn validate_score(value: Option<i64>, values: &RatingValues) -> Result<Option<i16>, ValidationError> {
    match value {
        None => Ok(None),
        Some(score) if values.score_in_bounds(score) => i16::try_from(score)
            .map(Some)
            .map_err(|_| ValidationError::new("score", INVALID_SCORE)),
        Some(_) => Err(ValidationError::new("score", INVALID_SCORE)),
    }
}

pub fn validate_user_type<'a>(
    value: &'a str,
    values: &RatingValues,
) -> Result<&'a str, ValidationError> {
    if values.is_valid_user_type(value) {
        Ok(value)
    } else {
        Err(ValidationError::new("user_type", INVALID_USER_TYPE))
    }
}

pub fn validate_comment(value: Option<&str>) -> Result<Option<&str>, ValidationError> {
    match value {
        Some(comment) if comment.chars().count() > COMMENT_MAX_LENGTH => Err(ValidationError::new(
            "comment",
            format!("Ensure this field has no more than {COMMENT_MAX_LENGTH} characters."),
        )),
        _ => Ok(value),
    }
}

pub fn validate_object_id(value: i64) -> Result<i64, ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(
            "object_id",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    Ok(value)
}

pub fn validate_content_type<'a>(
    value: &'a str,
    content_types: &ContentTypeRegistry,
) -> Result<&'a str, ValidationError> {
    if content_types.contains(value) {
        Ok(value)
    } else {
        Err(ValidationError::new("content_type", INVALID_CONTENT_TYPE))
    }
}

/// Collects field errors so every rejected field of a request is reported at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(err.field, err.message);
                None
            }
        }
    }

    /// Yields the value of a key that may not be null. A missing key is an
    /// error only when `required` is set; an explicit `null` always is.
    pub fn non_null<'v>(
        &mut self,
        field: &'static str,
        raw: &'v Option<Option<Value>>,
        required: bool,
    ) -> Option<&'v Value> {
        match raw {
            Some(Some(value)) => Some(value),
            Some(None) => {
                self.add(field, NOT_NULL);
                None
            }
            None => {
                if required {
                    self.add(field, REQUIRED);
                }
                None
            }
        }
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Validates the body of a rating element `POST`. Missing optional keys are stored as null.
pub fn rating_element_fields(
    payload: RatingElementPayload,
    values: &RatingValues,
) -> Result<NewRatingElement, AppError> {
    let changes = rating_element_changes(payload, values, true)?;
    let element_type = changes.element_type.ok_or(AppError::InternalError)?;

    Ok(NewRatingElement {
        element_type,
        score: changes.score.flatten(),
        comment: changes.comment.flatten(),
    })
}

/// Validates a rating element `PUT` (`required`) or `PATCH`.
///
/// Only the keys present in the body become changes; an explicit `null`
/// clears `score` or `comment`.
pub fn rating_element_changes(
    payload: RatingElementPayload,
    values: &RatingValues,
    required: bool,
) -> Result<RatingElementChanges, AppError> {
    let mut v = Validator::new();

    let element_type = v
        .non_null("element_type", &payload.element_type, required)
        .and_then(|value| v.check(expect_string("element_type", value)))
        .and_then(|value| v.check(validate_element_type(value, values)))
        .map(str::to_string);

    let score = match &payload.score {
        Some(Some(value)) => v.check(
            expect_integer("score", value).and_then(|score| validate_score(Some(score), values)),
        ),
        Some(None) => Some(None),
        None => None,
    };

    let comment = match &payload.comment {
        Some(Some(value)) => v
            .check(expect_string("comment", value).and_then(|comment| validate_comment(Some(comment))))
            .map(|comment| comment.map(str::to_string)),
        Some(None) => Some(None),
        None => None,
    };

    v.finish()?;

    Ok(RatingElementChanges {
        element_type,
        score,
        comment,
    })
}

/// Checks object rating bodies against the configured values, the content
/// type registry and the rating elements that exist in the store.
pub struct ObjectRatingValidator<'a> {
    pub values: &'a RatingValues,
    pub content_types: &'a ContentTypeRegistry,
    pub store: &'a dyn RatingStore,
}

impl ObjectRatingValidator<'_> {
    /// Validates the body of a `POST` or `PUT`.
    pub async fn fields(&self, payload: ObjectRatingPayload) -> Result<ObjectRatingFields, AppError> {
        let changes = self.check(payload, true).await?;

        match changes {
            ObjectRatingChanges {
                user_type: Some(user_type),
                content_type: Some(content_type),
                object_id: Some(object_id),
                elements: Some(elements),
            } => Ok(ObjectRatingFields {
                user_type,
                content_type,
                object_id,
                elements,
            }),
            _ => Err(AppError::InternalError),
        }
    }

    /// Validates a `PATCH`; only the keys present in the body are checked.
    pub async fn changes(&self, payload: ObjectRatingPayload) -> Result<ObjectRatingChanges, AppError> {
        self.check(payload, false).await
    }

    async fn check(
        &self,
        payload: ObjectRatingPayload,
        required: bool,
    ) -> Result<ObjectRatingChanges, AppError> {
        let mut v = Validator::new();

        let user_type = v
            .non_null("user_type", &payload.user_type, required)
            .and_then(|value| v.check(expect_string("user_type", value)))
            .and_then(|value| v.check(validate_user_type(value, self.values)))
            .map(str::to_string);

        let content_type = v
            .non_null("content_type", &payload.content_type, required)
            .and_then(|value| v.check(expect_string("content_type", value)))
            .and_then(|value| v.check(validate_content_type(value, self.content_types)))
            .map(str::to_string);

        let object_id = v
            .non_null("object_id", &payload.object_id, required)
            .and_then(|value| v.check(expect_integer("object_id", value)))
            .and_then(|value| v.check(validate_object_id(value)));

        let elements = v
            .non_null("elements", &payload.elements, required)
            .and_then(|value| v.check(expect_pk_list("elements", value)));

        if let Some(elements) = &elements {
            for missing in self.store.missing_rating_elements(elements).await? {
                v.add("elements", element_does_not_exist(missing));
            }
        }

        v.finish()?;

        Ok(ObjectRatingChanges {
            user_type,
            content_type,
            object_id,
            elements,
        })
    }
}
