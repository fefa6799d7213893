use std::{collections::BTreeMap, sync::Arc};

use futures::{FutureExt, future::BoxFuture};
use serde::Serialize;
use serde_json::Value;

use crate::{db::RatingStore, errors::AppError};

/// Loads the target of a polymorphic reference, `Ok(None)` when the id does not exist.
pub type TargetLoader =
    fn(Arc<dyn RatingStore>, i64) -> BoxFuture<'static, Result<Option<Value>, AppError>>;

/// Maps a `content_type` kind string to the loader for that kind of entity.
///
/// Object ratings only store `(content_type, object_id)`; this table is what
/// turns that pair back into an entity.
#[derive(Clone)]
pub struct ContentTypeRegistry {
    loaders: BTreeMap<String, TargetLoader>,
}

impl Default for ContentTypeRegistry {
    fn default() -> Self {
        Self::empty()
            .with("user", load_user)
            .with("rating_element", load_rating_element)
            .with("object_rating", load_object_rating)
    }
}

impl ContentTypeRegistry {
    pub fn empty() -> Self {
        Self {
            loaders: BTreeMap::new(),
        }
    }

    /// Registers `kind`, replacing any loader already registered for it.
    pub fn with(mut self, kind: impl Into<String>, loader: TargetLoader) -> Self {
        self.loaders.insert(kind.into(), loader);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.loaders.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.loaders.keys().map(String::as_str)
    }

    pub async fn resolve(
        &self,
        kind: &str,
        object_id: i64,
        store: Arc<dyn RatingStore>,
    ) -> Result<Option<Value>, AppError> {
        let loader = self
            .loaders
            .get(kind)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown content type '{kind}'")))?;

        loader(store, object_id).await
    }
}

fn found<T: Serialize>(result: Result<T, AppError>) -> Result<Option<Value>, AppError> {
    match result {
        Ok(entity) => serde_json::to_value(entity)
            .map(Some)
            .map_err(|_| AppError::InternalError),
        Err(AppError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn load_user(store: Arc<dyn RatingStore>, id: i64) -> BoxFuture<'static, Result<Option<Value>, AppError>> {
    async move { found(store.get_user(id).await) }.boxed()
}

fn load_rating_element(
    store: Arc<dyn RatingStore>,
    id: i64,
) -> BoxFuture<'static, Result<Option<Value>, AppError>> {
    async move { found(store.get_rating_element(id).await) }.boxed()
}

fn load_object_rating(
    store: Arc<dyn RatingStore>,
    id: i64,
) -> BoxFuture<'static, Result<Option<Value>, AppError>> {
    async move { found(store.get_object_rating(id).await) }.boxed()
}
