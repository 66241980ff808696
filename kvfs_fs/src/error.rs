use kvfs_core::StoreError;

/// Errors surfaced by the namespace layer.
///
/// A path that does not resolve is normally reported as `Ok(None)` by the
/// resolver; `NotFound` is only produced by helpers that require a node.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("not found: {path}")]
    NotFound { path: String },
    #[error("not a folder: {path}")]
    NotAFolder { path: String },
    #[error("not a file: {path}")]
    NotAFile { path: String },
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("an entry named {name:?} already exists")]
    DuplicateName { name: String },
    #[error("no entry {entry:?} in folder")]
    EntryNotFound { entry: String },
    #[error("the root folder cannot be renamed or removed")]
    RootImmutable,
    #[error("id generator produced an unusable key {id:?}")]
    InvalidId { id: String },
    #[error("tree is inconsistent, refusing to continue: {0}")]
    Inconsistent(String),
    #[error("failed to encode node: {0}")]
    Encode(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Crate-wide result alias.
pub type FsResult<T> = Result<T, FsError>;
