use bytes::Bytes;
use dashmap::DashMap;
use futures::stream;
use kvfs_core::store::{KeyStream, StoreFeatures, StoreResult};

#[derive(Debug)]
pub struct MemoryStore {
    entries: DashMap<String, Bytes>,
}

impl MemoryStore {
    /// Creates a new, empty `MemoryStore`.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl kvfs_core::store::Store for MemoryStore {
    /// Returns the value stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        Ok(self.entries.get(key).map(|value| value.clone()))
    }

    /// Stores `value` under `key`.
    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    /// Deletes `key` if present.
    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    /// Returns a stream of all keys in the store.
    async fn list(&self) -> StoreResult<KeyStream> {
        let keys: Vec<StoreResult<String>> = self
            .entries
            .iter()
            .map(|entry| Ok(entry.key().clone()))
            .collect();
        Ok(Box::new(stream::iter(keys)))
    }

    fn features(&self) -> StoreFeatures {
        StoreFeatures {
            supports_list: true,
            case_sensitive: true,
        }
    }
}
