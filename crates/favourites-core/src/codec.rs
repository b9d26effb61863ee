// Text form of the cached favourites list
use crate::{models::FavouriteItem, Error, Result};

pub fn encode_favourites(items: &[FavouriteItem]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}

/// Anything that is not a JSON array of favourites is reported as
/// `Error::CacheDecode` so callers can treat it as a cache miss
pub fn decode_favourites(text: &str) -> Result<Vec<FavouriteItem>> {
    serde_json::from_str(text).map_err(Error::CacheDecode)
}
