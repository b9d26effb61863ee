// Favourites business logic: model, backend contract, session-cached service
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod providers;
pub mod service;
pub mod store;

pub use config::Config;
pub use context::{FixedLocation, PageLocation, SiteContext};
pub use error::Error;
pub use models::{FavouriteItem, ItemFields, ListQuery};
pub use providers::SharePointStore;
pub use service::FavouritesService;
pub use store::FavouritesStore;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
