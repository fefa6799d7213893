pub mod handlers;
pub mod routes;

use axum::extract::FromRequest;

use crate::errors::AppError;

pub use routes::create_http_routes;

/// `Json` whose rejections render as `{"detail": ...}` like every other error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
