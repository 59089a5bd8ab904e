use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use tracing::warn;

use crate::error::StorageError;
use crate::traits::StateStore;

/// Whole store kept as one pretty-printed JSON object on disk; every write
/// rewrites the file.
pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// A file that does not parse opens empty; it is overwritten by the next write.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
            match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "state file is not valid JSON; starting empty");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>> {
        self.inner.lock().map_err(|_| StorageError::Poisoned.into())
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        std::fs::write(&self.path, bytes).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

/// Default location under a review root.
pub fn default_state_path(root: &Path) -> PathBuf {
    root.join(".triage").join("state.json")
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    // The cache only changes once the file holds the new state.
    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.lock()?;
        let mut next = inner.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *inner = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut inner = self.lock()?;
        if !inner.contains_key(key) {
            return Ok(());
        }
        let mut next = inner.clone();
        next.remove(key);
        self.flush(&next)?;
        *inner = next;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn survives_reopen() {
        let dir = tempdir().unwrap();
        let path = default_state_path(dir.path());
        let store = JsonFileStore::open(&path).unwrap();
        store.put("sivi-findings-a.xml-t", r#"{"version":1}"#).unwrap();
        drop(store);

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("sivi-findings-a.xml-t").unwrap().as_deref(), Some(r#"{"version":1}"#));
        store.remove("sivi-findings-a.xml-t").unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.keys().unwrap().is_empty());

        store.put("k", "v").unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn failed_write_leaves_cache_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.put("kept", "1").unwrap();

        // a directory where the file should be makes every write fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.put("k", "v").is_err());
        assert_eq!(store.get("k").unwrap(), None);
        assert!(store.remove("kept").is_err());
        assert_eq!(store.get("kept").unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys().unwrap(), vec!["kept".to_string()]);
    }

    #[test]
    fn unusable_parent_is_reported() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = JsonFileStore::open(&blocker.join("state.json")).unwrap();
        let err = store.put("k", "v").unwrap_err();
        assert!(format!("{err:#}").starts_with(&format!("create {}", blocker.display())));
    }
}
