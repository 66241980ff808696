//! Turns absolute paths into nodes by walking folder entries from the root.
//!
//! The resolver only reads. A missing root is reported like any other
//! missing path; creating it is the caller's job.

use tracing::warn;

use crate::context::FsContext;
use crate::node::{File, Folder, Node, NodeDecodeError, NodeKind};
use crate::path::{ROOT_PATH, segments};
use crate::FsResult;

/// A node together with the store key it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    /// Store key holding `node`.
    pub key: String,
    /// Path the node was reached by.
    pub path: String,
    pub node: Node,
}

impl ResolvedNode {
    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    pub fn is_root(&self) -> bool {
        self.key == ROOT_PATH
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        self.node.as_folder()
    }

    pub fn as_file(&self) -> Option<&File> {
        self.node.as_file()
    }
}

/// Outcome of reading a single key, keeping malformed values distinct from
/// absent ones for diagnostics.
#[derive(Debug)]
pub enum Fetched {
    Missing,
    Malformed(NodeDecodeError),
    Node(Node),
}

/// Reads and decodes the node stored under `key`.
pub async fn fetch_node(ctx: &FsContext, key: &str) -> FsResult<Fetched> {
    let Some(bytes) = ctx.store.get(key).await? else {
        return Ok(Fetched::Missing);
    };
    Ok(match Node::from_bytes(&bytes) {
        Ok(node) => Fetched::Node(node),
        Err(err) => Fetched::Malformed(err),
    })
}

/// Reads the node under `key`, treating an undecodable value as absent.
pub async fn load_node(ctx: &FsContext, key: &str) -> FsResult<Option<Node>> {
    match fetch_node(ctx, key).await? {
        Fetched::Node(node) => Ok(Some(node)),
        Fetched::Missing => Ok(None),
        Fetched::Malformed(err) => {
            warn!(key, %err, "malformed node, treating as not found");
            Ok(None)
        }
    }
}

/// Resolves `path` to the node it names.
///
/// Returns `Ok(None)` when any segment is missing, when the walk would pass
/// through a file, or when a node on the way cannot be decoded. Store
/// faults are returned as errors. Names are matched exactly and the first
/// matching entry wins.
pub async fn resolve(ctx: &FsContext, path: &str) -> FsResult<Option<ResolvedNode>> {
    let mut current = ROOT_PATH.to_owned();

    for segment in segments(path)? {
        let Some(node) = load_node(ctx, &current).await? else {
            return Ok(None);
        };
        let Node::Folder(folder) = node else {
            return Ok(None);
        };
        let Some(entry) = folder.entry_by_name(segment) else {
            return Ok(None);
        };
        current = entry.id.clone();
    }

    Ok(load_node(ctx, &current).await?.map(|node| ResolvedNode {
        key: current,
        path: path.to_owned(),
        node,
    }))
}
