use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use triage_storage::{StateStore, StorageError};

/// SQLite-backed key/value store. One row per saved artifact.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let conn = Connection::open(db_path).with_context(|| format!("open sqlite db {}", db_path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        let init_sql = include_str!("../migrations/0001_init.sql");
        conn.execute_batch(init_sql).context("apply schema")?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned.into())
    }

    /// Unix seconds of the last write to `key`.
    pub fn updated_at(&self, key: &str) -> Result<Option<i64>> {
        let conn = self.lock()?;
        let ts = conn
            .query_row("SELECT updated_at FROM kv WHERE key = ?1", params![key], |r| r.get(0))
            .optional()?;
        Ok(ts)
    }
}

pub fn default_db_path(root: &Path) -> PathBuf {
    root.join(".triage").join("state.sqlite")
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl StateStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |r| r.get(0))
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv(key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now_unix()],
        )
        .with_context(|| format!("write key {key}"))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn put_overwrites_and_keys_are_sorted() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.put("b", "1").unwrap();
        store.put("a", "2").unwrap();
        store.put("b", "3").unwrap();
        assert_eq!(store.get("b").unwrap().as_deref(), Some("3"));
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert!(store.updated_at("a").unwrap().is_some());
        assert!(store.updated_at("zz").unwrap().is_none());
    }

    #[test]
    fn remove_missing_key_is_fine() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.remove("nope").unwrap();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = default_db_path(dir.path());
        {
            let store = SqliteStore::open(&path).unwrap();
            store.put("k", "v").unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn unusable_parent_is_reported() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let err = SqliteStore::open(&blocker.join("state.sqlite")).err().unwrap();
        assert!(format!("{err:#}").starts_with(&format!("create {}", blocker.display())));
    }
}
