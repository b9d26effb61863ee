// Backend implementations of FavouritesStore
pub mod sharepoint;

pub use sharepoint::SharePointStore;
