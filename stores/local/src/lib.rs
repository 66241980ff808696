use anyhow::Context;
use bytes::Bytes;
use futures::stream;
use kvfs_core::store::{KeyStream, StoreError, StoreFeatures, StoreResult};
use std::path::PathBuf;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalStoreConfig {
    pub base_path: String,
}

/// Stores each key as one file directly under `base_path`.
///
/// File names are the base32 encoding of the key, so keys may contain `/`
/// and the store behaves the same on case-insensitive filesystems.
#[derive(Debug, Clone)]
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        LocalStore {
            base_path: base_path.into(),
        }
    }

    pub fn create(config: LocalStoreConfig) -> Self {
        LocalStore {
            base_path: config.base_path.into(),
        }
    }

    fn resolve_path(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.base_path.join(encode_key(key)))
    }
}

fn encode_key(key: &str) -> String {
    let mut output = Vec::with_capacity(base32_fs::encoded_len(key.len()));
    base32_fs::encode(key.as_bytes(), &mut output);
    // base32-fs only emits ASCII
    String::from_utf8_lossy(&output).into_owned()
}

fn decode_key(file_name: &str) -> Option<String> {
    if !base32_fs::is_valid(file_name.as_bytes()) {
        return None;
    }
    let len = base32_fs::decoded_len(file_name.len())?;
    let mut out = Vec::with_capacity(len);
    base32_fs::decode(file_name.as_bytes(), &mut out).ok()?;
    String::from_utf8(out).ok()
}

#[async_trait::async_trait]
impl kvfs_core::store::Store for LocalStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        let full_path = self.resolve_path(key)?;
        match tokio::fs::read(&full_path).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a temporary sibling first and renames it into place, so a
    /// reader sees either the old value or the new one.
    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        let full_path = self.resolve_path(key)?;
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .with_context(|| format!("failed to create store directory {:?}", self.base_path))?;

        let file_name = encode_key(key);
        let tmp_path = self.base_path.join(format!(".{file_name}.tmp"));
        tokio::fs::write(&tmp_path, &value).await?;
        tokio::fs::rename(&tmp_path, &full_path).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let full_path = self.resolve_path(key)?;
        match tokio::fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> StoreResult<KeyStream> {
        let mut keys: Vec<StoreResult<String>> = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.base_path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Box::new(stream::iter(keys)));
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            match decode_key(file_name) {
                Some(key) => keys.push(Ok(key)),
                None => tracing::debug!("local store: skipping foreign file {file_name:?}"),
            }
        }

        Ok(Box::new(stream::iter(keys)))
    }

    fn features(&self) -> StoreFeatures {
        StoreFeatures {
            supports_list: true,
            case_sensitive: true,
        }
    }
}
