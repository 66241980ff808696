//! Core kvfs types and traits.
//!
//! This crate defines the one seam every other kvfs crate builds on: a flat,
//! asynchronous key-value [`Store`] offering `get`, `set` and `delete` by
//! opaque key. Each call is atomic on its own; there is no multi-key
//! transaction. The hierarchical namespace in `kvfs_fs` is layered entirely
//! on top of this interface.
//!
//! Backends live in their own crates:
//!
//! - `kvfs_store_memory` (in-process, `DashMap`)
//! - `kvfs_store_local` (one file per key)
//! - `kvfs_store_redb` (embedded redb database)
//!
//! With the `testutil` feature enabled, [`testutil`] exposes a conformance
//! suite for backends plus wrapper stores for observing and failing writes.

pub mod store;

// Test utilities (behind feature flag)
#[cfg(feature = "testutil")]
pub mod testutil;

pub use store::{KeyStream, Store, StoreError, StoreFeatures, StoreResult};
