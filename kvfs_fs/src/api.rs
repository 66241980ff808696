//! Path-level façade over the resolver and the mutator.

use crate::context::FsContext;
use crate::mutator::Mutator;
use crate::node::{DirEntry, NodeKind};
use crate::path::{self, ROOT_PATH};
use crate::resolver::{self, Fetched, ResolvedNode};
use crate::{FsError, FsResult};

/// The main API for working with a namespace by path.
///
/// Every action resolves the paths it needs first and then hands the
/// resolved nodes to a [`Mutator`]. Actions are not queued or locked: the
/// caller must not start a mutation on a folder while another one on the
/// same folder is still running.
#[derive(Debug, Clone)]
pub struct Namespace {
    ctx: FsContext,
}

impl Namespace {
    pub fn open(ctx: FsContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &FsContext {
        &self.ctx
    }

    /// Resolves the root folder, creating it if the store has none yet.
    ///
    /// Only an absent root is bootstrapped. A root that cannot be decoded is
    /// an error and is left untouched in the store.
    pub async fn root(&self) -> FsResult<ResolvedNode> {
        match resolver::fetch_node(&self.ctx, ROOT_PATH).await? {
            Fetched::Node(node) => Ok(ResolvedNode {
                key: ROOT_PATH.to_owned(),
                path: ROOT_PATH.to_owned(),
                node,
            }),
            Fetched::Missing => Mutator::new(&self.ctx).bootstrap_root().await,
            Fetched::Malformed(err) => Err(FsError::Inconsistent(format!(
                "root folder under key {ROOT_PATH:?} is malformed: {err}"
            ))),
        }
    }

    /// Resolves `path`. Resolving the root bootstraps it on first use.
    ///
    /// ```rust,no_run
    /// # use kvfs_fs::{FsContext, Namespace};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), kvfs_fs::FsError> {
    /// let ns = Namespace::open(FsContext::memory());
    /// assert!(ns.resolve("/").await?.is_some());
    /// assert!(ns.resolve("/missing").await?.is_none());
    /// # Ok(()) }
    /// ```
    pub async fn resolve(&self, path: &str) -> FsResult<Option<ResolvedNode>> {
        if path::is_root(path) {
            return self.root().await.map(Some);
        }
        resolver::resolve(&self.ctx, path).await
    }

    /// Like [`Namespace::resolve`] but a missing node is an error.
    pub async fn stat(&self, path: &str) -> FsResult<ResolvedNode> {
        self.resolve(path).await?.ok_or_else(|| FsError::NotFound {
            path: path.to_owned(),
        })
    }

    /// Entries of the folder at `path`, in stored order.
    pub async fn list(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        let folder = self.folder(path).await?;
        Ok(folder.as_folder().map(|f| f.entries.clone()).unwrap_or_default())
    }

    /// Contents of the file at `path`.
    pub async fn read(&self, path: &str) -> FsResult<Vec<u8>> {
        let node = self.stat(path).await?;
        match node.as_file() {
            Some(file) => Ok(file.contents.clone()),
            None => Err(FsError::NotAFile {
                path: path.to_owned(),
            }),
        }
    }

    /// Creates an empty folder at `path`. The parent must exist.
    pub async fn create_folder(&self, path: &str) -> FsResult<DirEntry> {
        let (parent_path, name) = split_new(path)?;
        let mut parent = self.folder(&parent_path).await?;
        Mutator::new(&self.ctx).create_folder(&mut parent, name).await
    }

    /// Creates a file at `path` with the given initial contents.
    pub async fn create_file(&self, path: &str, contents: impl Into<Vec<u8>>) -> FsResult<DirEntry> {
        let (parent_path, name) = split_new(path)?;
        let mut parent = self.folder(&parent_path).await?;
        Mutator::new(&self.ctx)
            .create_file(&mut parent, name, contents)
            .await
    }

    /// Replaces the contents of the existing file at `path`.
    pub async fn write(&self, path: &str, contents: impl Into<Vec<u8>>) -> FsResult<()> {
        let mut file = self.stat(path).await?;
        Mutator::new(&self.ctx)
            .replace_contents(&mut file, contents)
            .await
    }

    /// Renames the entry at `path` within its folder, returning the new path.
    pub async fn rename(&self, path: &str, new_name: &str) -> FsResult<String> {
        let (parent_path, name) = split_existing(path)?;
        let mut parent = self.folder(&parent_path).await?;
        Mutator::new(&self.ctx)
            .rename_child(&mut parent, name, new_name)
            .await?;
        Ok(path::join(&parent_path, new_name))
    }

    /// Removes the entry at `path`. A folder's descendants are not visited.
    pub async fn remove(&self, path: &str) -> FsResult<DirEntry> {
        let (parent_path, name) = split_existing(path)?;
        let mut parent = self.folder(&parent_path).await?;
        let id = parent
            .as_folder()
            .and_then(|folder| folder.entry_by_name(name))
            .map(|entry| entry.id.clone())
            .ok_or_else(|| FsError::NotFound {
                path: path.to_owned(),
            })?;
        Mutator::new(&self.ctx).delete_child(&mut parent, &id).await
    }

    async fn folder(&self, path: &str) -> FsResult<ResolvedNode> {
        let node = self.stat(path).await?;
        if node.kind() != NodeKind::Folder {
            return Err(FsError::NotAFolder {
                path: path.to_owned(),
            });
        }
        Ok(node)
    }
}

fn split_new(path: &str) -> FsResult<(String, &str)> {
    path::segments(path)?;
    match (path::parent(path), path::file_name(path)) {
        (Some(parent), Some(name)) => Ok((parent, name)),
        _ => Err(FsError::InvalidPath {
            path: path.to_owned(),
            reason: "the root already exists",
        }),
    }
}

fn split_existing(path: &str) -> FsResult<(String, &str)> {
    path::segments(path)?;
    match (path::parent(path), path::file_name(path)) {
        (Some(parent), Some(name)) => Ok((parent, name)),
        _ => Err(FsError::RootImmutable),
    }
}
