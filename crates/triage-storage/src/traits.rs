/// Durable string key/value store. Keys are opaque; values are JSON text.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> anyhow::Result<()>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> anyhow::Result<()>;
    /// All keys, sorted.
    fn keys(&self) -> anyhow::Result<Vec<String>>;
}
