//! RedbStore - a single-file key-value backend backed by redb.

use bytes::Bytes;
use futures::stream;
use kvfs_core::store::{KeyStream, StoreFeatures, StoreResult};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::{path::Path, sync::Arc};

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct RedbStoreConfig {
    /// Path of the database file.
    pub path: String,
}

/// `Store` implementation keeping every key in one redb table.
///
/// Each call runs in its own transaction, which gives exactly the per-key
/// atomicity the trait promises and nothing more.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Ensure the `kv` table exists so the first access may be a read.
        {
            let write_txn = db.begin_write()?;
            {
                let _ = write_txn.open_table(TABLE)?;
            }
            write_txn.commit()?;
        }

        Ok(Self { db: Arc::new(db) })
    }

    pub fn create(config: RedbStoreConfig) -> anyhow::Result<Self> {
        Self::open(config.path)
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish()
    }
}

#[async_trait::async_trait]
impl kvfs_core::store::Store for RedbStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        let db = self.db.clone();
        let key = key.to_owned();

        let value = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<Bytes>> {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(TABLE)?;
            let value = table
                .get(key.as_str())?
                .map(|guard| Bytes::copy_from_slice(guard.value()));
            Ok(value)
        })
        .await
        .map_err(|e| anyhow::anyhow!("redb read task failed: {}", e))??;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        let db = self.db.clone();
        let key = key.to_owned();

        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(TABLE)?;
                table.insert(key.as_str(), value.as_ref())?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| anyhow::anyhow!("redb write task failed: {}", e))??;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let db = self.db.clone();
        let key = key.to_owned();

        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(TABLE)?;
                table.remove(key.as_str())?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| anyhow::anyhow!("redb delete task failed: {}", e))??;
        Ok(())
    }

    async fn list(&self) -> StoreResult<KeyStream> {
        let db = self.db.clone();

        let keys = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<String>> {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(TABLE)?;
            let mut keys = Vec::new();
            for item in table.iter()? {
                let (key, _value) = item?;
                keys.push(key.value().to_owned());
            }
            Ok(keys)
        })
        .await
        .map_err(|e| anyhow::anyhow!("redb list task failed: {}", e))??;

        Ok(Box::new(stream::iter(keys.into_iter().map(Ok))))
    }

    fn features(&self) -> StoreFeatures {
        StoreFeatures {
            supports_list: true,
            case_sensitive: true,
        }
    }
}
