use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use triage_core::{ArtifactIdentity, FindingId, Status, StatusStore};

use crate::traits::StateStore;

pub const ENTRY_VERSION: u32 = 1;
pub const DEFAULT_NAMESPACE: &str = "sivi-findings";

/// What one key holds: the status map of one validated artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEntry {
    pub version: u32,
    pub file_name: String,
    pub validation_timestamp: String,
    pub statuses: StatusStore,
}

/// Saves and restores status maps keyed by artifact identity.
///
/// Nothing here returns an error: a failed write is logged and the caller's
/// in-memory store stays authoritative; a missing, malformed or foreign entry
/// reads as an empty store.
pub struct PersistenceAdapter {
    store: Box<dyn StateStore>,
    namespace: String,
}

impl PersistenceAdapter {
    pub fn new(store: Box<dyn StateStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self, identity: &ArtifactIdentity) -> String {
        identity.storage_key(&self.namespace)
    }

    /// Returns whether the write reached the store.
    pub fn save(&self, identity: &ArtifactIdentity, statuses: &StatusStore) -> bool {
        let entry = StorageEntry {
            version: ENTRY_VERSION,
            file_name: identity.file_name.clone(),
            validation_timestamp: identity.validation_timestamp.clone(),
            statuses: statuses.clone(),
        };
        let key = self.key(identity);
        let written = serde_json::to_string(&entry)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.put(&key, &json));
        match written {
            Ok(()) => {
                debug!(%key, count = statuses.len(), "statuses saved");
                true
            }
            Err(e) => {
                warn!(%key, error = %e, "could not save statuses; keeping them in memory only");
                false
            }
        }
    }

    pub fn load(&self, identity: &ArtifactIdentity) -> StatusStore {
        let key = self.key(identity);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StatusStore::new(),
            Err(e) => {
                warn!(%key, error = %e, "could not read saved statuses");
                return StatusStore::new();
            }
        };
        match parse_entry(&raw) {
            Ok(statuses) => {
                debug!(%key, count = statuses.len(), "statuses restored");
                statuses
            }
            Err(reason) => {
                warn!(%key, %reason, "ignoring saved statuses");
                StatusStore::new()
            }
        }
    }

    pub fn clear(&self, identity: &ArtifactIdentity) {
        let key = self.key(identity);
        if let Err(e) = self.store.remove(&key) {
            warn!(%key, error = %e, "could not clear saved statuses");
        }
    }

    /// Keys under this adapter's namespace.
    pub fn saved_keys(&self) -> Vec<String> {
        let prefix = format!("{}-", self.namespace);
        match self.store.keys() {
            Ok(keys) => keys.into_iter().filter(|k| k.starts_with(&prefix)).collect(),
            Err(e) => {
                warn!(error = %e, "could not list saved statuses");
                Vec::new()
            }
        }
    }
}

fn parse_entry(raw: &str) -> Result<StatusStore, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("malformed JSON: {e}"))?;
    let version = value.get("version").and_then(Value::as_u64);
    if version != Some(u64::from(ENTRY_VERSION)) {
        return Err(format!("unsupported version {version:?}"));
    }
    let Some(statuses) = value.get("statuses").and_then(Value::as_object) else {
        return Err("no statuses".to_string());
    };
    let mut out = StatusStore::new();
    for (id, status) in statuses {
        match status.as_str().map(str::parse::<Status>) {
            Some(Ok(s)) => {
                out.set(FindingId::from_str(id.as_str()), s);
            }
            _ => warn!(id = %id, value = %status, "dropping unknown status"),
        }
    }
    Ok(out)
}
