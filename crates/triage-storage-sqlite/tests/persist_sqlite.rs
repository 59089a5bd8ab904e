use tempfile::tempdir;
use triage_core::{ArtifactIdentity, FindingId, Status, StatusStore};
use triage_storage::{PersistenceAdapter, DEFAULT_NAMESPACE};
use triage_storage_sqlite::{default_db_path, SqliteStore};

#[test]
fn statuses_persist_across_adapters() {
    let dir = tempdir().unwrap();
    let path = default_db_path(dir.path());
    let identity = ArtifactIdentity::new("polis.xml", "2026-03-01T10:00:00");

    let mut statuses = StatusStore::new();
    statuses.set(FindingId::from_str("DL1:AN:E1-002:CODE:0"), Status::Geaccepteerd);

    let adapter = PersistenceAdapter::new(Box::new(SqliteStore::open(&path).unwrap()), DEFAULT_NAMESPACE);
    assert!(adapter.save(&identity, &statuses));
    drop(adapter);

    let adapter = PersistenceAdapter::new(Box::new(SqliteStore::open(&path).unwrap()), DEFAULT_NAMESPACE);
    assert_eq!(adapter.load(&identity), statuses);
    adapter.clear(&identity);
    assert!(adapter.load(&identity).is_empty());
}
