pub mod object_rating;
pub mod rating_element;
pub mod user;

use axum::{Json, http::StatusCode};
use serde_json::Value;

pub use object_rating::{
    create_object_rating_handler, delete_object_rating_handler, get_object_rating_handler,
    get_object_rating_target_handler, list_object_ratings_handler, patch_object_rating_handler,
    put_object_rating_handler,
};
pub use rating_element::{
    create_rating_element_handler, delete_rating_element_handler, get_rating_element_handler,
    list_rating_elements_handler, patch_rating_element_handler, put_rating_element_handler,
};
pub use user::{create_user_handler, delete_current_user_handler, get_current_user_handler};

/// Error half of every handler result: status plus a JSON body.
pub type ApiError = (StatusCode, Json<Value>);
