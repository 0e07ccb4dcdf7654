//! SQLite-backed key/value storage

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{init_db, run_migrations, Storage, StorageError};

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = init_db(path)?;
        tracing::debug!("Opened state store at {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, blob, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_key() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.load("nothing").unwrap(), None);
    }

    #[test]
    fn test_save_overwrites() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.save("state", "{\"a\":1}").unwrap();
        storage.save("state", "{\"a\":2}").unwrap();
        assert_eq!(storage.load("state").unwrap().as_deref(), Some("{\"a\":2}"));
    }

    #[test]
    fn test_remove() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.save("state", "{}").unwrap();
        storage.remove("state").unwrap();
        assert_eq!(storage.load("state").unwrap(), None);
        // removing twice is fine
        storage.remove("state").unwrap();
    }

    #[test]
    fn test_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.db");
        {
            let mut storage = SqliteStorage::open(&path).unwrap();
            storage.save("state", "{\"streak\":4}").unwrap();
        }
        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(storage.load("state").unwrap().as_deref(), Some("{\"streak\":4}"));
    }
}
