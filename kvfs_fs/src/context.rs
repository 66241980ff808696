//! Defines the session context shared by the resolver and the mutator.

use kvfs_core::Store;
use kvfs_store_memory::MemoryStore;
use std::sync::Arc;

use crate::ids::{IdGenerator, RandomIds};

/// Everything the namespace layer needs to talk to the outside world.
///
/// The context holds no tree data; the tree lives only in the store, so two
/// contexts over the same store always observe the same namespace.
#[derive(Debug, Clone)]
pub struct FsContext {
    pub store: Arc<dyn Store>,
    pub ids: Arc<dyn IdGenerator>,
}

impl FsContext {
    /// Creates a context over `store` using random 128-bit ids.
    pub fn new<S: Store>(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    pub fn from_arc(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            ids: Arc::new(RandomIds),
        }
    }

    /// Context over a fresh, empty in-memory store.
    pub fn memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Replaces the id generator, e.g. with `SequentialIds` in tests.
    pub fn with_ids<I: IdGenerator + 'static>(mut self, ids: I) -> Self {
        self.ids = Arc::new(ids);
        self
    }
}
