pub mod auth;
pub mod config;
pub mod content_types;
pub mod db;
pub mod errors;
mod http;
mod middleware;
pub mod models;
pub mod state;
pub mod validation;

use std::{net::SocketAddr, sync::Arc};

use axum::{Json, Router, http::StatusCode};
use serde_json::json;
use tower::ServiceBuilder;

use crate::{
    config::{Config, StoreBackend},
    content_types::ContentTypeRegistry,
    db::{MemoryStore, PgStore, RatingStore},
    errors::AppError,
    middleware::{cors_layer, timeout_layer, trace_layer},
    state::AppState,
};

/// The rating API without transport concerns such as CORS.
pub fn create_app(state: AppState) -> Router {
    http::create_http_routes(state)
        .layer(ServiceBuilder::new().layer(trace_layer()).layer(timeout_layer()))
        .fallback(|| async { (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))) })
}

pub async fn start_server() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let store: Arc<dyn RatingStore> = match (config.store, config.database_url.as_deref()) {
        (StoreBackend::Postgres, Some(url)) => {
            Arc::new(PgStore::connect(url, config.run_migrations).await?)
        }
        (StoreBackend::Postgres, None) => {
            return Err(AppError::EnvError("DATABASE_URL must be set".into()));
        }
        (StoreBackend::Memory, _) => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    tracing::info!(
        "Valid user types: {:?}, valid element types: {:?}, score range {}..={}",
        config.rating_values.valid_user_types(),
        config.rating_values.valid_element_types(),
        config.rating_values.min_score(),
        config.rating_values.max_score()
    );

    let state = AppState::new(
        store,
        config.rating_values.clone(),
        ContentTypeRegistry::default(),
        &config.jwt_secret,
    );

    let app = create_app(state).layer(cors_layer(&config.allowed_origins)?);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .map_err(|e| AppError::EnvError(format!("Failed to bind port {}: {}", config.port, e)))?;

    tracing::info!("Rating server listening on http://0.0.0.0:{}", config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Server error: {}", e);
        AppError::InternalError
    })
}
