//! # kvfs file-system
//!
//! A hierarchical namespace of folders and files stored in a flat
//! key-value [`Store`](kvfs_core::Store) that only offers per-key
//! `get`/`set`/`delete`.
//!
//! Every node lives under its own key. The root folder is kept under the
//! key `"/"`; every other node gets a random key when it is created and
//! keeps it for life. Folders hold an ordered list of named entries that
//! point at child keys.
//!
//! ## Layers
//! 1. `node`     – the stored data model (CBOR encoded).
//! 2. `resolver` – walks a path one key lookup per segment. Read-only.
//! 3. `mutator`  – structural edits as ordered store writes, so that an
//!    interrupted edit leaves at most an orphaned key, never a dangling
//!    entry.
//! 4. `api`      – the path-level [`Namespace`] façade.
//! 5. `check` / `gc` – consistency report and orphan reclamation.

mod api;
pub mod check;
mod context;
pub mod debug;
mod error;
pub mod gc;
pub mod ids;
pub mod mutator;
pub mod node;
pub mod path;
pub mod resolver;

pub use api::Namespace;
pub use context::FsContext;
pub use error::{FsError, FsResult};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use mutator::Mutator;
pub use node::{DirEntry, File, Folder, Node, NodeKind};
pub use resolver::{ResolvedNode, resolve};
