/// Namespace for favourites entries in the session store
pub const CACHE_KEY_PREFIX: &str = "MyFavourites_";

/// What the hosting environment knows about where we are and who is asking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteContext {
    /// Absolute URL of the current site
    pub web_url: String,
    /// Email or login name of the current user
    pub user_login: String,
}

impl SiteContext {
    /// A trailing `/` on the site URL is dropped so one site always maps to
    /// one cache key
    pub fn new(web_url: impl Into<String>, user_login: impl Into<String>) -> Self {
        let web_url = web_url.into();
        Self {
            web_url: web_url.trim_end_matches('/').to_string(),
            user_login: user_login.into(),
        }
    }

    /// Session key holding this site's favourites
    pub fn cache_key(&self) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, self.web_url)
    }
}

/// Source of the page address the user is currently looking at.
///
/// Read at the moment of each create/update, so implementations may change
/// their answer between calls.
pub trait PageLocation: Send + Sync {
    fn current_url(&self) -> String;
}

/// A location that never moves
#[derive(Debug, Clone)]
pub struct FixedLocation(pub String);

impl FixedLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }
}

impl PageLocation for FixedLocation {
    fn current_url(&self) -> String {
        self.0.clone()
    }
}
