// REST client for the backend list that holds the favourites
pub mod sharepoint;

pub use sharepoint::{SharePointClient, SharePointError, SharePointUser};
