// Session-scoped key-value stores backing the favourites cache
// One trait, an in-process map for tests and embedding, SQLite for the CLI

pub mod session;
pub mod sqlite;

pub use session::{CacheError, MemorySessionStore, Result, SessionStore};
pub use sqlite::SqliteSessionStore;
