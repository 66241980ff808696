//! Test utilities for `Store` implementations.
//!
//! This module provides a conformance suite that can be run against any
//! `Store` implementation, plus two wrapper stores used by higher layers to
//! observe and sabotage the writes they issue.
//!
//! # Usage
//!
//! In your store crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! kvfs_core = { workspace = true, features = ["testutil"] }
//! ```
//!
//! In your test file:
//!
//! ```ignore
//! use kvfs_core::testutil::StoreTests;
//!
//! #[tokio::test]
//! async fn test_my_store() {
//!     let store = MyStore::new(...);
//!     StoreTests::new(&store).run_all().await.unwrap();
//! }
//! ```

use crate::store::{KeyStream, Store, StoreError, StoreFeatures, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Test suite for `Store` implementations.
pub struct StoreTests<'a, S> {
    store: &'a S,
    /// Prefix for test keys to avoid conflicts
    prefix: String,
}

impl<'a, S: Store> StoreTests<'a, S> {
    /// Create a new test suite for the given store.
    pub fn new(store: &'a S) -> Self {
        let prefix = format!("_test_{}_", rand::rng().random::<u32>());
        Self { store, prefix }
    }

    /// Create a new test suite with a custom prefix.
    pub fn with_prefix(store: &'a S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Run all tests.
    pub async fn run_all(&self) -> StoreResult<()> {
        self.test_set_get().await?;
        self.test_get_missing().await?;
        self.test_overwrite().await?;
        self.test_delete().await?;
        self.test_delete_missing().await?;
        self.test_separator_keys().await?;
        self.test_empty_value().await?;

        if self.store.features().case_sensitive {
            self.test_case_sensitive().await?;
        }
        if self.store.features().supports_list {
            self.test_list().await?;
            self.cleanup().await?;
        }

        Ok(())
    }

    /// Test basic set and get.
    pub async fn test_set_get(&self) -> StoreResult<()> {
        let key = self.key("set_get");
        let data = Bytes::from_static(b"hello, world!");

        self.store.set(&key, data.clone()).await?;

        let retrieved = self.store.get(&key).await?;
        assert_eq!(retrieved, Some(data), "retrieved data should match original");

        Ok(())
    }

    /// Test that absent keys read as `None`.
    pub async fn test_get_missing(&self) -> StoreResult<()> {
        let key = self.key("never_written");
        assert_eq!(
            self.store.get(&key).await?,
            None,
            "unwritten key should be absent"
        );
        Ok(())
    }

    /// Test overwriting existing values.
    pub async fn test_overwrite(&self) -> StoreResult<()> {
        let key = self.key("overwrite");

        self.store
            .set(&key, Bytes::from_static(b"original content"))
            .await?;
        self.store
            .set(&key, Bytes::from_static(b"new content"))
            .await?;

        let retrieved = self.store.get(&key).await?;
        assert_eq!(
            retrieved.as_deref(),
            Some(&b"new content"[..]),
            "overwritten content should be new"
        );

        Ok(())
    }

    /// Test deletion.
    pub async fn test_delete(&self) -> StoreResult<()> {
        let key = self.key("delete");

        self.store
            .set(&key, Bytes::from_static(b"to be deleted"))
            .await?;
        assert!(
            self.store.get(&key).await?.is_some(),
            "key should exist before delete"
        );

        self.store.delete(&key).await?;

        assert!(
            self.store.get(&key).await?.is_none(),
            "key should not exist after delete"
        );

        Ok(())
    }

    /// Deleting an absent key must succeed.
    pub async fn test_delete_missing(&self) -> StoreResult<()> {
        let key = self.key("delete_missing");
        self.store.delete(&key).await?;
        self.store.delete(&key).await?;
        Ok(())
    }

    /// Keys may contain `/` and the base64url alphabet; `"/"` alone is valid.
    pub async fn test_separator_keys(&self) -> StoreResult<()> {
        let keys = [
            self.key("a/b"),
            self.key("-_+=Az09"),
            "/".to_string(),
        ];
        let previous_root = self.store.get("/").await?;

        for (i, key) in keys.iter().enumerate() {
            self.store.set(key, Bytes::from(vec![i as u8; 3])).await?;
        }
        for (i, key) in keys.iter().enumerate() {
            let value = self.store.get(key).await?;
            assert_eq!(
                value.as_deref(),
                Some(&[i as u8; 3][..]),
                "value for key {key:?} should round-trip"
            );
        }

        match previous_root {
            Some(value) => self.store.set("/", value).await?,
            None => self.store.delete("/").await?,
        }
        Ok(())
    }

    /// Empty values are distinct from absent keys.
    pub async fn test_empty_value(&self) -> StoreResult<()> {
        let key = self.key("empty");
        self.store.set(&key, Bytes::new()).await?;
        assert_eq!(
            self.store.get(&key).await?,
            Some(Bytes::new()),
            "empty value should be stored, not treated as absent"
        );
        Ok(())
    }

    /// Keys differing only in case are distinct keys.
    pub async fn test_case_sensitive(&self) -> StoreResult<()> {
        let lower = self.key("case_key");
        let upper = self.key("CASE_KEY");

        self.store.set(&lower, Bytes::from_static(b"lower")).await?;
        self.store.set(&upper, Bytes::from_static(b"upper")).await?;

        assert_eq!(self.store.get(&lower).await?.as_deref(), Some(&b"lower"[..]));
        assert_eq!(self.store.get(&upper).await?.as_deref(), Some(&b"upper"[..]));

        Ok(())
    }

    /// Test key listing.
    pub async fn test_list(&self) -> StoreResult<()> {
        let names = ["list_a", "list_b", "list/c"];

        for name in &names {
            self.store
                .set(&self.key(name), Bytes::from_static(b"list test"))
                .await?;
        }

        let found = self.collect_prefixed_keys().await?;
        for name in &names {
            let key = self.key(name);
            assert!(found.contains(&key), "list should contain {}", key);
        }

        Ok(())
    }

    async fn collect_prefixed_keys(&self) -> StoreResult<HashSet<String>> {
        let mut stream = self.store.list().await?;
        let mut found = HashSet::new();
        while let Some(result) = stream.next().await {
            let key = result?;
            if key.starts_with(&self.prefix) {
                found.insert(key);
            }
        }
        Ok(found)
    }

    /// Clean up test keys.
    pub async fn cleanup(&self) -> StoreResult<()> {
        for key in self.collect_prefixed_keys().await? {
            self.store.delete(&key).await?;
        }
        Ok(())
    }
}

/// A single call observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Get(String),
    Set(String),
    Delete(String),
}

impl StoreOp {
    pub fn is_write(&self) -> bool {
        !matches!(self, StoreOp::Get(_))
    }
}

/// Wraps a store and records every call in order.
#[derive(Debug)]
pub struct RecordingStore<S> {
    inner: S,
    ops: Mutex<Vec<StoreOp>>,
}

impl<S: Store> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            ops: Mutex::new(Vec::new()),
        }
    }

    /// All recorded calls, oldest first.
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().expect("recording lock poisoned").clone()
    }

    /// Only the `set` and `delete` calls, oldest first.
    pub fn writes(&self) -> Vec<StoreOp> {
        self.ops().into_iter().filter(StoreOp::is_write).collect()
    }

    pub fn clear(&self) {
        self.ops.lock().expect("recording lock poisoned").clear();
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn record(&self, op: StoreOp) {
        self.ops.lock().expect("recording lock poisoned").push(op);
    }
}

#[async_trait]
impl<S: Store> Store for RecordingStore<S> {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        self.record(StoreOp::Get(key.to_owned()));
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.record(StoreOp::Set(key.to_owned()));
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.record(StoreOp::Delete(key.to_owned()));
        self.inner.delete(key).await
    }

    async fn list(&self) -> StoreResult<KeyStream> {
        self.inner.list().await
    }

    fn features(&self) -> StoreFeatures {
        self.inner.features()
    }
}

/// Wraps a store and fails one chosen write, simulating a crash partway
/// through a multi-key update.
///
/// Writes are numbered from zero across `set` and `delete`. The failing
/// write is not applied to the inner store; writes after it go through.
#[derive(Debug)]
pub struct FailingStore<S> {
    inner: S,
    writes: AtomicUsize,
    fail_at: AtomicUsize,
}

impl<S: Store> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
            fail_at: AtomicUsize::new(usize::MAX),
        }
    }

    /// Fails the `n`-th write issued from now on (0 = the next write).
    pub fn fail_write(&self, n: usize) {
        let current = self.writes.load(Ordering::SeqCst);
        self.fail_at.store(current + n, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check_write(&self, key: &str) -> StoreResult<()> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst);
        if n == self.fail_at.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other(format!(
                "injected failure writing {key:?}"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: Store> Store for FailingStore<S> {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.check_write(key)?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.check_write(key)?;
        self.inner.delete(key).await
    }

    async fn list(&self) -> StoreResult<KeyStream> {
        self.inner.list().await
    }

    fn features(&self) -> StoreFeatures {
        self.inner.features()
    }
}

/// Generate random bytes for testing.
pub fn random_bytes(len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    rand::rng().fill(&mut data[..]);
    Bytes::from(data)
}
