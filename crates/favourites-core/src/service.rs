// Favourites service: read-through session cache in front of the backend list
use std::sync::Arc;

use favourites_cache::SessionStore;
use tracing::{debug, error, info};

use crate::{
    codec::{decode_favourites, encode_favourites},
    context::{PageLocation, SiteContext},
    models::{FavouriteItem, ItemFields, ListQuery},
    store::FavouritesStore,
    Error, Result,
};

pub const FAVOURITES_LIST_NAME: &str = "Favourites";

/// The current user's favourites for one site.
///
/// Reads go through a session cache keyed by the site URL. Every successful
/// mutation is followed by a full re-fetch that overwrites the cache, so the
/// cache always holds what the backend last returned rather than a local patch.
///
/// The cache is shared with anything else holding the same session store and
/// nothing serialises a fetch with its cache write: two overlapping refreshes
/// leave whichever response landed last.
pub struct FavouritesService {
    site: SiteContext,
    cache_key: String,
    list_name: String,
    store: Box<dyn FavouritesStore>,
    session: Arc<dyn SessionStore>,
    location: Arc<dyn PageLocation>,
}

impl FavouritesService {
    /// Build the service once the host has resolved the site context
    pub fn new(
        site: SiteContext,
        store: Box<dyn FavouritesStore>,
        session: Arc<dyn SessionStore>,
        location: Arc<dyn PageLocation>,
    ) -> Self {
        Self {
            cache_key: site.cache_key(),
            site,
            list_name: FAVOURITES_LIST_NAME.to_string(),
            store,
            session,
            location,
        }
    }

    pub fn with_list_name(mut self, list_name: impl Into<String>) -> Self {
        self.list_name = list_name.into();
        self
    }

    pub fn site(&self) -> &SiteContext {
        &self.site
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// Favourites from the cache when allowed and non-empty, otherwise from
    /// the backend. Failures are logged and come back as an empty list.
    pub async fn get_favourites(&self, try_from_cache: bool) -> Vec<FavouriteItem> {
        match self.try_get_favourites(try_from_cache).await {
            Ok(items) => items,
            Err(e) => {
                error!("Failed to fetch favourites: {}", e);
                Vec::new()
            }
        }
    }

    /// Like `get_favourites`, but backend failures are returned.
    ///
    /// An empty cached list counts as a miss, so a user with no favourites
    /// hits the backend on every cache-preferring read.
    pub async fn try_get_favourites(&self, try_from_cache: bool) -> Result<Vec<FavouriteItem>> {
        if try_from_cache {
            let cached = self.read_cache();
            if !cached.is_empty() {
                return Ok(cached);
            }
        }

        let items = self.fetch_from_list().await?;
        self.write_cache(&items);
        Ok(items)
    }

    pub async fn save_favourite(&self, item: &FavouriteItem) -> bool {
        match self.try_save_favourite(item).await {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to save favourite: {}", e);
                false
            }
        }
    }

    /// Create the favourite for the current page and refresh the cache.
    /// Returns the record as the backend stored it.
    pub async fn try_save_favourite(&self, item: &FavouriteItem) -> Result<FavouriteItem> {
        let fields = ItemFields::for_page(item, &self.location.current_url());
        let added = self.store.add(&self.list_name, &fields).await?;
        debug!("Added favourite {:?}", added.id);

        self.refresh().await;
        Ok(added)
    }

    pub async fn update_favourite(&self, item: &FavouriteItem) -> bool {
        match self.try_update_favourite(item).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to update favourite: {}", e);
                false
            }
        }
    }

    pub async fn try_update_favourite(&self, item: &FavouriteItem) -> Result<()> {
        let id = item.id.ok_or(Error::MissingId)?;
        let fields = ItemFields::for_page(item, &self.location.current_url());
        self.store.update(&self.list_name, id, &fields).await?;
        debug!("Updated favourite {}", id);

        self.refresh().await;
        Ok(())
    }

    pub async fn delete_favourite(&self, id: i64) -> bool {
        match self.try_delete_favourite(id).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to delete favourite {}: {}", id, e);
                false
            }
        }
    }

    pub async fn try_delete_favourite(&self, id: i64) -> Result<()> {
        self.store.delete(&self.list_name, id).await?;
        debug!("Deleted favourite {}", id);

        self.refresh().await;
        Ok(())
    }

    /// The mutation already succeeded; a failed refresh only leaves the
    /// previous cache entry in place
    async fn refresh(&self) {
        self.get_favourites(false).await;
    }

    /// Cached favourites, or an empty list on a miss or unreadable entry
    fn read_cache(&self) -> Vec<FavouriteItem> {
        let text = match self.session.get(&self.cache_key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("Cache miss for {}", self.cache_key);
                return Vec::new();
            }
            Err(e) => {
                error!("Failed to read favourites cache: {}", e);
                return Vec::new();
            }
        };

        match decode_favourites(&text) {
            Ok(items) if !items.is_empty() => {
                info!("Fetched {} favourites from cache", items.len());
                items
            }
            Ok(_) => {
                debug!("Cached favourites for {} are empty", self.site.web_url);
                Vec::new()
            }
            Err(e) => {
                error!("{}", e);
                Vec::new()
            }
        }
    }

    fn write_cache(&self, items: &[FavouriteItem]) {
        let result = encode_favourites(items)
            .and_then(|text| self.session.set(&self.cache_key, &text).map_err(Error::from));
        if let Err(e) = result {
            error!("Failed to cache favourites: {}", e);
        }
    }

    async fn fetch_from_list(&self) -> Result<Vec<FavouriteItem>> {
        let user_id = self.resolve_user_id().await?;
        let items = self
            .store
            .query(&self.list_name, &ListQuery::authored_by(user_id))
            .await?;

        info!("Fetched {} favourites from list", items.len());
        Ok(items)
    }

    async fn resolve_user_id(&self) -> Result<i64> {
        self.store
            .resolve_user(&self.site.user_login)
            .await
            .map_err(|e| Error::UserResolution(format!("{}: {}", self.site.user_login, e)))
    }
}
