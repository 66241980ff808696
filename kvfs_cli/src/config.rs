use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use kvfs_core::Store;
use kvfs_store_local::{LocalStore, LocalStoreConfig};
use kvfs_store_memory::MemoryStore;
use kvfs_store_redb::{RedbStore, RedbStoreConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KvfsConfig {
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum StoreConfig {
    Local(LocalStoreConfig),
    Redb(RedbStoreConfig),
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreKind {
    Memory,
    Local,
    Redb,
}

impl StoreConfig {
    /// The store of `kind` at its default place below `data_dir`.
    pub fn default_for(kind: StoreKind, data_dir: &Path) -> anyhow::Result<Self> {
        Ok(match kind {
            StoreKind::Memory => Self::Memory,
            StoreKind::Local => Self::Local(LocalStoreConfig {
                base_path: path_string(&data_dir.join("store"))?,
            }),
            StoreKind::Redb => Self::Redb(RedbStoreConfig {
                path: path_string(&data_dir.join("kvfs.redb"))?,
            }),
        })
    }
}

impl KvfsConfig {
    /// Reads `config_file`, or falls back to a local store under
    /// `data_dir` if the file does not exist.
    pub fn load_or_default(config_file: &Path, data_dir: &Path) -> anyhow::Result<Self> {
        if !config_file.exists() {
            debug!("no config file at {config_file:?}, using defaults");
            return Ok(Self {
                store: StoreConfig::default_for(StoreKind::Local, data_dir)?,
            });
        }
        let toml_content = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read config file {config_file:?}"))?;
        toml::from_str(&toml_content)
            .with_context(|| format!("invalid config file {config_file:?}"))
    }
}

pub fn create_store(config: StoreConfig) -> anyhow::Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match config {
        StoreConfig::Local(config) => Arc::new(LocalStore::create(config)),
        StoreConfig::Redb(config) => Arc::new(RedbStore::create(config)?),
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
    };
    debug!(?store, "opened store");
    Ok(store)
}

pub fn path_string(path: &Path) -> anyhow::Result<String> {
    path.to_str()
        .map(str::to_owned)
        .with_context(|| format!("path {path:?} is not valid UTF-8"))
}
