// SharePoint store - bridges the REST client with the FavouritesStore trait
use async_trait::async_trait;
use favourites_api::{SharePointClient, SharePointError};

use crate::{
    models::{FavouriteItem, ItemFields, ListQuery},
    store::FavouritesStore,
    Error, Result,
};

/// Wrapper around SharePointClient that implements FavouritesStore
pub struct SharePointStore {
    client: SharePointClient,
}

impl SharePointStore {
    pub fn new(client: SharePointClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FavouritesStore for SharePointStore {
    async fn add(&self, list: &str, fields: &ItemFields) -> Result<FavouriteItem> {
        self.client
            .add_item(list, fields)
            .await
            .map_err(to_core_error)
    }

    async fn update(&self, list: &str, id: i64, fields: &ItemFields) -> Result<()> {
        self.client
            .update_item(list, id, fields)
            .await
            .map_err(to_core_error)
    }

    async fn delete(&self, list: &str, id: i64) -> Result<()> {
        self.client
            .delete_item(list, id)
            .await
            .map_err(to_core_error)
    }

    async fn query(&self, list: &str, query: &ListQuery) -> Result<Vec<FavouriteItem>> {
        self.client
            .get_items(list, &query.select, &query.filter)
            .await
            .map_err(to_core_error)
    }

    async fn resolve_user(&self, login: &str) -> Result<i64> {
        let user = self
            .client
            .ensure_user(login)
            .await
            .map_err(to_core_error)?;
        Ok(user.id)
    }
}

fn to_core_error(err: SharePointError) -> Error {
    match err {
        SharePointError::NotFound(what) => Error::NotFound(what),
        auth @ SharePointError::AuthRequired => Error::AuthError(auth.to_string()),
        other => Error::ApiError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            to_core_error(SharePointError::NotFound("Favourites item 3".into())),
            Error::NotFound(what) if what == "Favourites item 3"
        ));
        assert!(matches!(
            to_core_error(SharePointError::AuthRequired),
            Error::AuthError(_)
        ));
        assert!(matches!(
            to_core_error(SharePointError::RateLimitExceeded),
            Error::ApiError(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_api_error() {
        let client = SharePointClient::new("http://127.0.0.1:1", None).unwrap();
        let store = SharePointStore::new(client);

        let result = store.delete("Favourites", 1).await;
        assert!(matches!(result, Err(Error::ApiError(_))));
    }
}
