use thiserror::Error;

/// Everything that can go wrong between the service and its collaborators.
///
/// The boolean/empty-list service API swallows these after logging them; the
/// `try_*` variants hand them to the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Could not resolve user {0}")]
    UserResolution(String),

    #[error("Favourite has no Id, it was never saved")]
    MissingId,

    #[error("Cache operation failed: {0}")]
    CacheError(#[from] favourites_cache::CacheError),

    #[error("Cached favourites are corrupted: {0}")]
    CacheDecode(#[source] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
