//! Human-readable dump of a subtree, used by `kvfs tree`.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::context::FsContext;
use crate::node::Node;
use crate::resolver::{Fetched, fetch_node, resolve};
use crate::{FsError, FsResult};

/// Renders the subtree at `path` as indented text, one entry per line.
///
/// Folders end in `/`, files show their size. Entries that cannot be read
/// are shown with a marker instead of aborting the listing. Every key is
/// expanded at most once: an entry leading back to one of its ancestors is
/// marked as a cycle, any other repeated key as shared.
pub async fn render_tree(ctx: &FsContext, path: &str) -> FsResult<String> {
    let start = resolve(ctx, path).await?.ok_or_else(|| FsError::NotFound {
        path: path.to_owned(),
    })?;

    let mut out = String::new();
    let _ = writeln!(out, "{}", describe(path, &start.node));

    // Depth-first, children in stored order. `ancestors[d]` is the key of
    // the folder at depth `d` on the current branch.
    let mut stack: Vec<(usize, String, String)> = Vec::new();
    let mut ancestors = vec![start.key.clone()];
    let mut seen = HashSet::from([start.key.clone()]);
    push_children(&mut stack, 1, &start.node);

    while let Some((depth, name, key)) = stack.pop() {
        let indent = "  ".repeat(depth);
        ancestors.truncate(depth);
        if ancestors.contains(&key) {
            let _ = writeln!(out, "{indent}{name}  <cycle {key}>");
            continue;
        }
        if !seen.insert(key.clone()) {
            let _ = writeln!(out, "{indent}{name}  <shared {key}>");
            continue;
        }
        match fetch_node(ctx, &key).await? {
            Fetched::Node(node) => {
                let _ = writeln!(out, "{indent}{}", describe(&name, &node));
                ancestors.push(key);
                push_children(&mut stack, depth + 1, &node);
            }
            Fetched::Missing => {
                let _ = writeln!(out, "{indent}{name}  <missing {key}>");
            }
            Fetched::Malformed(_) => {
                let _ = writeln!(out, "{indent}{name}  <malformed {key}>");
            }
        }
    }

    Ok(out)
}

fn push_children(stack: &mut Vec<(usize, String, String)>, depth: usize, node: &Node) {
    if let Node::Folder(folder) = node {
        for entry in folder.entries.iter().rev() {
            stack.push((depth, entry.name.clone(), entry.id.clone()));
        }
    }
}

fn describe(name: &str, node: &Node) -> String {
    match node {
        Node::Folder(_) if name.ends_with('/') => name.to_owned(),
        Node::Folder(_) => format!("{name}/"),
        Node::File(file) => format!("{name}  ({} bytes)", file.contents.len()),
    }
}
