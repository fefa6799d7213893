#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use object_rating::{
    auth::generate_jwt,
    config::RatingValues,
    content_types::ContentTypeRegistry,
    create_app,
    db::{MemoryStore, RatingStore},
    models::{NewObjectRating, NewRatingElement, ObjectRating, RatingElement, User},
    state::AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub app: Router,
    pub store: Arc<dyn RatingStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_values(RatingValues::default())
    }

    pub fn with_values(values: RatingValues) -> Self {
        let store: Arc<dyn RatingStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), values, ContentTypeRegistry::default(), SECRET);

        Self {
            app: create_app(state),
            store,
        }
    }

    /// Creates a user straight in the store and returns it with a bearer token.
    pub async fn user(&self, username: &str) -> (User, String) {
        let user = self.store.create_user(username).await.unwrap();
        let token = generate_jwt(&user, SECRET).unwrap();
        (user, token)
    }

    pub async fn element(&self, score: Option<i16>, comment: Option<&str>) -> RatingElement {
        self.store
            .create_rating_element(NewRatingElement {
                element_type: "E".into(),
                score,
                comment: comment.map(str::to_string),
            })
            .await
            .unwrap()
    }

    pub async fn rating(&self, user: &User, elements: Vec<i64>) -> ObjectRating {
        self.store
            .create_object_rating(NewObjectRating {
                user: user.id,
                user_type: "U".into(),
                content_type: "user".into(),
                object_id: user.id,
                elements,
            })
            .await
            .unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }
}
