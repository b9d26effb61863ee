use serde::{Deserialize, Deserializer, Serialize};

/// Columns read back from the favourites list
pub const FAVOURITE_FIELDS: [&str; 4] = ["Id", "Title", "ItemUrl", "Description"];

/// A bookmark to a page, owned by the user who created it.
///
/// Field names follow the list columns so the same shape goes over the wire
/// and into the session cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FavouriteItem {
    /// Assigned by the backend, `None` until the item is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub item_url: String,
}

impl FavouriteItem {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            item_url: String::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Empty list columns come back as explicit nulls
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Writable columns sent on create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemFields {
    pub title: String,
    pub description: String,
    pub item_url: String,
}

impl ItemFields {
    /// The URL always comes from the page the user is on, whatever the item says
    pub fn for_page(item: &FavouriteItem, page_url: &str) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            item_url: page_url.to_string(),
        }
    }
}

/// Projection plus OData filter for a list read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub select: Vec<String>,
    pub filter: String,
}

impl ListQuery {
    /// Favourites created by the given site user
    pub fn authored_by(user_id: i64) -> Self {
        Self {
            select: FAVOURITE_FIELDS.iter().map(|f| f.to_string()).collect(),
            filter: format!("Author eq {}", user_id),
        }
    }
}
