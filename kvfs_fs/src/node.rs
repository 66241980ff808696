//! Stored node types and their CBOR encoding.

use bytes::Bytes;
use minicbor::{CborLen, Decode, Encode};
use std::collections::HashSet;

use crate::FsError;
use crate::path::validate_name;

#[derive(Encode, Decode, CborLen, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cbor(index_only)]
pub enum NodeKind {
    #[n(0)]
    Folder,
    #[n(1)]
    File,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Folder => "folder",
            NodeKind::File => "file",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named pointer from a folder to the storage key of a child node.
///
/// `kind` duplicates the child's own kind so a listing can be rendered
/// without fetching every child.
#[derive(Encode, Decode, CborLen, Clone, Debug, PartialEq, Eq)]
#[cbor(map)]
pub struct DirEntry {
    #[n(0)]
    pub kind: NodeKind,
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub id: String,
}

impl DirEntry {
    pub fn new(kind: NodeKind, name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            id: id.into(),
        }
    }
}

#[derive(Encode, Decode, CborLen, Clone, Debug, Default, PartialEq, Eq)]
#[cbor(map)]
pub struct Folder {
    #[n(0)]
    pub entries: Vec<DirEntry>,
}

impl Folder {
    pub fn new() -> Self {
        Self::default()
    }

    /// First entry whose name equals `name` exactly.
    pub fn entry_by_name(&self, name: &str) -> Option<&DirEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn entry_by_id(&self, id: &str) -> Option<&DirEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entry_by_name(name).is_some()
    }

    /// Names that appear more than once, each reported once, in first-seen order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for entry in &self.entries {
            if !seen.insert(entry.name.as_str()) && reported.insert(entry.name.as_str()) {
                duplicates.push(entry.name.as_str());
            }
        }
        duplicates
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Encode, Decode, CborLen, Clone, Debug, Default, PartialEq, Eq)]
#[cbor(map)]
pub struct File {
    #[n(0)]
    #[cbor(with = "minicbor::bytes")]
    pub contents: Vec<u8>,
}

impl File {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    /// Contents as text, if they are valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }
}

/// The unit of storage: every key in the store holds exactly one `Node`.
#[derive(Encode, Decode, CborLen, Clone, Debug, PartialEq, Eq)]
pub enum Node {
    #[n(0)]
    Folder(#[n(0)] Folder),
    #[n(1)]
    File(#[n(0)] File),
}

#[derive(Debug, thiserror::Error)]
pub enum NodeDecodeError {
    #[error("invalid CBOR: {0}")]
    Cbor(#[from] minicbor::decode::Error),
    #[error("{0} trailing bytes after node")]
    TrailingBytes(usize),
    #[error("entry {name:?}: {reason}")]
    InvalidEntry { name: String, reason: &'static str },
}

impl Node {
    pub fn empty_folder() -> Self {
        Node::Folder(Folder::new())
    }

    pub fn empty_file() -> Self {
        Node::File(File::default())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Folder(_) => NodeKind::Folder,
            Node::File(_) => NodeKind::File,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Node::Folder(folder) => Some(folder),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Node::File(file) => Some(file),
            Node::Folder(_) => None,
        }
    }

    /// Decodes a node and checks the entry invariants that can be verified
    /// locally. Anything unexpected, including trailing data, is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Node, NodeDecodeError> {
        let mut decoder = minicbor::Decoder::new(bytes);
        let node: Node = decoder.decode()?;
        let remaining = bytes.len() - decoder.position();
        if remaining != 0 {
            return Err(NodeDecodeError::TrailingBytes(remaining));
        }
        if let Node::Folder(folder) = &node {
            for entry in &folder.entries {
                if let Err(reason) = validate_name(&entry.name) {
                    return Err(NodeDecodeError::InvalidEntry {
                        name: entry.name.clone(),
                        reason,
                    });
                }
                if entry.id.is_empty() {
                    return Err(NodeDecodeError::InvalidEntry {
                        name: entry.name.clone(),
                        reason: "empty id",
                    });
                }
            }
        }
        Ok(node)
    }

    /// Encodes this node to a CBOR `Vec<u8>`.
    pub fn to_vec(&self) -> Result<Vec<u8>, FsError> {
        minicbor::to_vec(self).map_err(|e| FsError::Encode(e.to_string()))
    }

    /// Encodes this node to CBOR as a `Bytes` buffer.
    pub fn to_bytes(&self) -> Result<Bytes, FsError> {
        Ok(self.to_vec()?.into())
    }
}

impl From<Folder> for Node {
    fn from(folder: Folder) -> Self {
        Node::Folder(folder)
    }
}

impl From<File> for Node {
    fn from(file: File) -> Self {
        Node::File(file)
    }
}
