use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;

/// Stream of keys returned by [`Store::list`].
pub type KeyStream = Box<dyn Stream<Item = StoreResult<String>> + Send + Unpin + 'static>;

/// Errors raised by a [`Store`] backend.
///
/// Callers above the store never interpret these beyond logging; they are
/// handed back unchanged to whoever started the operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("operation not supported by this store: {0}")]
    Unsupported(&'static str),
    #[error("invalid store key {0:?}")]
    InvalidKey(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A flat key-value store.
///
/// Every call is individually atomic. There is no ordering or transaction
/// spanning more than one key, so anything that needs multi-key consistency
/// has to get it from the order in which it issues calls.
#[async_trait]
pub trait Store: std::fmt::Debug + Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Streams every key currently held by the store.
    ///
    /// Optional capability; only maintenance tooling needs it.
    async fn list(&self) -> StoreResult<KeyStream> {
        Err(StoreError::Unsupported("list"))
    }

    fn features(&self) -> StoreFeatures;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreFeatures {
    pub supports_list: bool,
    pub case_sensitive: bool,
}
