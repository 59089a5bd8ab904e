use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::StorageError;
use crate::traits::StateStore;

/// In-memory store for tests and throwaway reviews. An optional byte quota
/// over all keys and values makes writes fail the way a full browser store does.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(bytes: usize) -> Self {
        Self {
            inner: Mutex::default(),
            quota: Some(bytes),
        }
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, BTreeMap<String, String>>> {
        self.inner.lock().map_err(|_| StorageError::Poisoned.into())
    }
}

impl StateStore for InMemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        if let Some(quota) = self.quota {
            let others: usize = inner
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota }.into());
            }
        }
        inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
