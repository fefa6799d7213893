use std::sync::Arc;

use crate::{config::RatingValues, content_types::ContentTypeRegistry, db::RatingStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RatingStore>,
    pub rating_values: Arc<RatingValues>,
    pub content_types: Arc<ContentTypeRegistry>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RatingStore>,
        rating_values: RatingValues,
        content_types: ContentTypeRegistry,
        jwt_secret: &str,
    ) -> Self {
        Self {
            store,
            rating_values: Arc::new(rating_values),
            content_types: Arc::new(content_types),
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}
