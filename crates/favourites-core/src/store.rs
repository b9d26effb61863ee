use async_trait::async_trait;

use crate::{
    models::{FavouriteItem, ItemFields, ListQuery},
    Result,
};

/// CRUD access to a named list in the backend.
///
/// The service only ever talks to the backend through this trait, which keeps
/// the transport swappable and lets tests script the backend's answers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavouritesStore: Send + Sync {
    /// Create an item; fails if the list is missing or the fields break its schema
    async fn add(&self, list: &str, fields: &ItemFields) -> Result<FavouriteItem>;

    /// Overwrite the given fields of an existing item
    async fn update(&self, list: &str, id: i64, fields: &ItemFields) -> Result<()>;

    async fn delete(&self, list: &str, id: i64) -> Result<()>;

    /// Items matching the filter; columns outside the projection are left empty
    async fn query(&self, list: &str, query: &ListQuery) -> Result<Vec<FavouriteItem>>;

    /// Backend user id for an email or login name
    async fn resolve_user(&self, login: &str) -> Result<i64>;
}
