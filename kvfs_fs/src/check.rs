//! Read-only consistency check of a namespace.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::FsResult;
use crate::context::FsContext;
use crate::node::{Node, NodeKind};
use crate::path::{self, ROOT_PATH};
use crate::resolver::{Fetched, fetch_node};

/// Something wrong with the stored tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// The root key is absent (fine for a store that was never opened).
    MissingRoot,
    /// The root key holds a file.
    RootNotAFolder,
    /// A value that does not decode as a node.
    Malformed { path: String, key: String, reason: String },
    /// An entry whose id has no node behind it.
    Dangling { path: String, id: String },
    /// An entry whose recorded kind disagrees with the node it points at.
    KindMismatch {
        path: String,
        recorded: NodeKind,
        actual: NodeKind,
    },
    /// Two entries of one folder share a name; only the first is reachable.
    DuplicateName { folder: String, name: String },
    /// A key referenced by more than one entry, or by one of its own descendants.
    SharedKey { path: String, id: String },
}

impl Problem {
    /// True for problems that mean some referenced key could not be read.
    pub fn breaks_reachability(&self) -> bool {
        !matches!(self, Problem::DuplicateName { .. })
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::MissingRoot => write!(f, "root folder is missing"),
            Problem::RootNotAFolder => write!(f, "root is not a folder"),
            Problem::Malformed { path, key, reason } => {
                write!(f, "{path}: malformed node under key {key:?}: {reason}")
            }
            Problem::Dangling { path, id } => write!(f, "{path}: entry points at missing key {id:?}"),
            Problem::KindMismatch {
                path,
                recorded,
                actual,
            } => write!(f, "{path}: entry says {recorded} but node is a {actual}"),
            Problem::DuplicateName { folder, name } => {
                write!(f, "{folder}: duplicate entry name {name:?}")
            }
            Problem::SharedKey { path, id } => {
                write!(f, "{path}: key {id:?} is referenced more than once")
            }
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckReport {
    pub folders: usize,
    pub files: usize,
    /// Every key referenced from the root, including the root itself.
    pub referenced: HashSet<String>,
    pub problems: Vec<Problem>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Walks every entry reachable from the root and reports invariant
/// violations. Never writes.
///
/// Entries hidden behind a duplicate name are still followed, so their keys
/// count as referenced.
pub async fn check_tree(ctx: &FsContext) -> FsResult<CheckReport> {
    let mut report = CheckReport::default();

    let root = match fetch_node(ctx, ROOT_PATH).await? {
        Fetched::Missing => {
            report.problems.push(Problem::MissingRoot);
            return Ok(report);
        }
        Fetched::Malformed(err) => {
            report.referenced.insert(ROOT_PATH.to_owned());
            report.problems.push(Problem::Malformed {
                path: ROOT_PATH.to_owned(),
                key: ROOT_PATH.to_owned(),
                reason: err.to_string(),
            });
            return Ok(report);
        }
        Fetched::Node(node) => node,
    };
    report.referenced.insert(ROOT_PATH.to_owned());

    let mut queue: VecDeque<(String, Node)> = VecDeque::new();
    match root {
        Node::Folder(_) => queue.push_back((ROOT_PATH.to_owned(), root)),
        Node::File(_) => {
            report.problems.push(Problem::RootNotAFolder);
            return Ok(report);
        }
    }

    while let Some((folder_path, node)) = queue.pop_front() {
        let Node::Folder(folder) = node else {
            report.files += 1;
            continue;
        };
        report.folders += 1;

        for name in folder.duplicate_names() {
            report.problems.push(Problem::DuplicateName {
                folder: folder_path.clone(),
                name: name.to_owned(),
            });
        }

        for entry in folder.entries {
            let entry_path = path::join(&folder_path, &entry.name);
            if !report.referenced.insert(entry.id.clone()) {
                report.problems.push(Problem::SharedKey {
                    path: entry_path,
                    id: entry.id,
                });
                continue;
            }

            match fetch_node(ctx, &entry.id).await? {
                Fetched::Missing => report.problems.push(Problem::Dangling {
                    path: entry_path,
                    id: entry.id,
                }),
                Fetched::Malformed(err) => report.problems.push(Problem::Malformed {
                    path: entry_path,
                    key: entry.id,
                    reason: err.to_string(),
                }),
                Fetched::Node(child) => {
                    if child.kind() != entry.kind {
                        report.problems.push(Problem::KindMismatch {
                            path: entry_path.clone(),
                            recorded: entry.kind,
                            actual: child.kind(),
                        });
                    }
                    queue.push_back((entry_path, child));
                }
            }
        }
    }

    Ok(report)
}
