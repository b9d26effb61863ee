use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::session::{CacheError, Result, SessionStore};

/// Session store persisted in SQLite.
///
/// A CLI process is short-lived, so the "session" is a named scope inside the
/// database file instead of the process lifetime. Entries of different sessions
/// never see each other; `clear` ends the current session.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
    session_id: String,
}

impl SqliteSessionStore {
    pub fn open(db_path: &str, session_id: impl Into<String>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn, session_id.into())
    }

    pub fn open_in_memory(session_id: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, session_id.into())
    }

    fn with_connection(conn: Connection, session_id: String) -> Result<Self> {
        // Initialize schema on first run
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            session_id,
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS session_entries (
                session_id TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY(session_id, key)
            )",
            [],
        )?;

        Ok(())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }
}

impl SessionStore for SqliteSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM session_entries WHERE session_id = ?1 AND key = ?2",
                params![self.session_id, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO session_entries (session_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(session_id, key)
             DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.session_id, key, value, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM session_entries WHERE session_id = ?1 AND key = ?2",
            params![self.session_id, key],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM session_entries WHERE session_id = ?1",
            params![self.session_id],
        )?;
        debug!("Ended session {} ({} entries)", self.session_id, removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let store = SqliteSessionStore::open_in_memory("s1").unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "[]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[]"));

        store.set("k", r#"[{"Id":1}]"#).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(r#"[{"Id":1}]"#));
    }

    #[test]
    fn test_remove() {
        let store = SqliteSessionStore::open_in_memory("s1").unwrap();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_sessions_are_isolated_and_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.db");
        let path = path.to_str().unwrap();

        {
            let first = SqliteSessionStore::open(path, "first").unwrap();
            first.set("k", "one").unwrap();
        }

        let first = SqliteSessionStore::open(path, "first").unwrap();
        let second = SqliteSessionStore::open(path, "second").unwrap();
        assert_eq!(first.get("k").unwrap().as_deref(), Some("one"));
        assert_eq!(second.get("k").unwrap(), None);

        second.set("k", "two").unwrap();
        assert_eq!(first.get("k").unwrap().as_deref(), Some("one"));

        first.clear().unwrap();
        assert_eq!(first.get("k").unwrap(), None);
        assert_eq!(second.get("k").unwrap().as_deref(), Some("two"));
    }
}
