//! Structural edits to the tree, expressed as ordered store writes.
//!
//! The store has no multi-key transaction, so each operation orders its
//! writes so that an interruption can leave at most one unreferenced key
//! behind and never a folder entry pointing at nothing:
//!
//! - create writes the new child before the parent that references it;
//! - delete rewrites the parent before removing the child's key.
//!
//! The mutator never resolves paths. It works on nodes the caller already
//! resolved and updates the caller's copy of the parent only after the
//! parent write has succeeded, so a failed call leaves that copy untouched.

use tracing::debug;

use crate::context::FsContext;
use crate::ids::check_id;
use crate::node::{DirEntry, File, Folder, Node, NodeKind};
use crate::path::{ROOT_PATH, check_name};
use crate::resolver::ResolvedNode;
use crate::{FsError, FsResult};

pub struct Mutator<'a> {
    ctx: &'a FsContext,
}

impl<'a> Mutator<'a> {
    pub fn new(ctx: &'a FsContext) -> Self {
        Self { ctx }
    }

    /// Writes an empty root folder.
    ///
    /// Callers only do this after resolving `/` came back empty; an existing
    /// root would be overwritten.
    pub async fn bootstrap_root(&self) -> FsResult<ResolvedNode> {
        let node = Node::empty_folder();
        debug!(key = ROOT_PATH, "bootstrapping root folder");
        self.write_node(ROOT_PATH, &node).await?;
        Ok(ResolvedNode {
            key: ROOT_PATH.to_owned(),
            path: ROOT_PATH.to_owned(),
            node,
        })
    }

    /// Creates an empty folder named `name` inside `parent`.
    pub async fn create_folder(&self, parent: &mut ResolvedNode, name: &str) -> FsResult<DirEntry> {
        self.create_child(parent, name, Node::empty_folder()).await
    }

    /// Creates a file named `name` inside `parent` holding `contents`.
    pub async fn create_file(
        &self,
        parent: &mut ResolvedNode,
        name: &str,
        contents: impl Into<Vec<u8>>,
    ) -> FsResult<DirEntry> {
        self.create_child(parent, name, Node::File(File::new(contents)))
            .await
    }

    async fn create_child(
        &self,
        parent: &mut ResolvedNode,
        name: &str,
        child: Node,
    ) -> FsResult<DirEntry> {
        let folder = folder_of(parent)?;
        check_name(name)?;
        if folder.contains_name(name) {
            return Err(FsError::DuplicateName {
                name: name.to_owned(),
            });
        }

        let id = self.ctx.ids.next_id();
        check_id(&id)?;
        let entry = DirEntry::new(child.kind(), name, id);

        debug!(parent = %parent.key, child = %entry.id, name, kind = %entry.kind, "creating child");
        self.write_node(&entry.id, &child).await?;

        let mut entries = folder.entries.clone();
        entries.push(entry.clone());
        self.commit_entries(parent, entries).await?;

        Ok(entry)
    }

    /// Renames the entry called `name` to `new_name`. One write.
    pub async fn rename_child(
        &self,
        parent: &mut ResolvedNode,
        name: &str,
        new_name: &str,
    ) -> FsResult<()> {
        let folder = folder_of(parent)?;
        check_name(new_name)?;
        let index = folder
            .entries
            .iter()
            .position(|entry| entry.name == name)
            .ok_or_else(|| FsError::EntryNotFound {
                entry: name.to_owned(),
            })?;
        if name == new_name {
            return Ok(());
        }
        if folder.contains_name(new_name) {
            return Err(FsError::DuplicateName {
                name: new_name.to_owned(),
            });
        }

        let mut entries = folder.entries.clone();
        entries[index].name = new_name.to_owned();
        debug!(parent = %parent.key, from = name, to = new_name, "renaming child");
        self.commit_entries(parent, entries).await
    }

    /// Unlinks the entry whose id is `id`, then deletes the child's key.
    ///
    /// A folder's own children are not visited; their keys become orphans
    /// for the garbage collector.
    pub async fn delete_child(&self, parent: &mut ResolvedNode, id: &str) -> FsResult<DirEntry> {
        let folder = folder_of(parent)?;
        let index = folder
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| FsError::EntryNotFound {
                entry: id.to_owned(),
            })?;

        let mut entries = folder.entries.clone();
        let removed = entries.remove(index);
        debug!(parent = %parent.key, child = %removed.id, name = %removed.name, "deleting child");
        self.commit_entries(parent, entries).await?;

        self.ctx.store.delete(&removed.id).await?;
        Ok(removed)
    }

    /// Overwrites the contents of a file in place. One write.
    pub async fn replace_contents(
        &self,
        file: &mut ResolvedNode,
        contents: impl Into<Vec<u8>>,
    ) -> FsResult<()> {
        if file.kind() != NodeKind::File {
            return Err(FsError::NotAFile {
                path: file.path.clone(),
            });
        }
        let node = Node::File(File::new(contents));
        debug!(key = %file.key, "replacing file contents");
        self.write_node(&file.key, &node).await?;
        file.node = node;
        Ok(())
    }

    async fn commit_entries(&self, parent: &mut ResolvedNode, entries: Vec<DirEntry>) -> FsResult<()> {
        let node = Node::Folder(Folder { entries });
        self.write_node(&parent.key, &node).await?;
        parent.node = node;
        Ok(())
    }

    async fn write_node(&self, key: &str, node: &Node) -> FsResult<()> {
        self.ctx.store.set(key, node.to_bytes()?).await?;
        Ok(())
    }
}

fn folder_of(parent: &ResolvedNode) -> FsResult<&Folder> {
    parent.as_folder().ok_or_else(|| FsError::NotAFolder {
        path: parent.path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::resolver::{load_node, resolve};
    use kvfs_core::testutil::{FailingStore, RecordingStore, StoreOp};
    use kvfs_store_memory::MemoryStore;
    use std::sync::Arc;

    fn ctx() -> FsContext {
        FsContext::memory().with_ids(SequentialIds::new("n"))
    }

    async fn root(ctx: &FsContext) -> ResolvedNode {
        Mutator::new(ctx).bootstrap_root().await.unwrap()
    }

    #[tokio::test]
    async fn create_appends_entry_and_writes_child() {
        let ctx = ctx();
        let mut root = root(&ctx).await;
        let mutator = Mutator::new(&ctx);

        let docs = mutator.create_folder(&mut root, "docs").await.unwrap();
        let readme = mutator.create_file(&mut root, "readme", "hi").await.unwrap();

        assert_eq!(docs, DirEntry::new(NodeKind::Folder, "docs", "n0"));
        assert_eq!(readme, DirEntry::new(NodeKind::File, "readme", "n1"));
        assert_eq!(root.as_folder().unwrap().entries, vec![docs, readme]);

        let stored_root = load_node(&ctx, "/").await.unwrap().unwrap();
        assert_eq!(stored_root, root.node);
        assert_eq!(
            load_node(&ctx, "n0").await.unwrap(),
            Some(Node::empty_folder())
        );
        assert_eq!(
            load_node(&ctx, "n1").await.unwrap(),
            Some(Node::File(File::new("hi")))
        );
    }

    #[tokio::test]
    async fn create_writes_child_before_parent() {
        let store = Arc::new(RecordingStore::new(MemoryStore::new()));
        let ctx = FsContext::from_arc(store.clone()).with_ids(SequentialIds::new("n"));
        let mut root = root(&ctx).await;
        store.clear();

        Mutator::new(&ctx)
            .create_folder(&mut root, "docs")
            .await
            .unwrap();

        assert_eq!(
            store.writes(),
            vec![StoreOp::Set("n0".into()), StoreOp::Set("/".into())]
        );
    }

    #[tokio::test]
    async fn delete_rewrites_parent_before_removing_child() {
        let store = Arc::new(RecordingStore::new(MemoryStore::new()));
        let ctx = FsContext::from_arc(store.clone()).with_ids(SequentialIds::new("n"));
        let mut root = root(&ctx).await;
        let mutator = Mutator::new(&ctx);
        let entry = mutator.create_file(&mut root, "f", "").await.unwrap();
        store.clear();

        let removed = mutator.delete_child(&mut root, &entry.id).await.unwrap();

        assert_eq!(removed, entry);
        assert_eq!(
            store.writes(),
            vec![StoreOp::Set("/".into()), StoreOp::Delete("n0".into())]
        );
        assert!(root.as_folder().unwrap().is_empty());
        assert!(!store.inner().contains_key("n0"));
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected_before_any_write() {
        let store = Arc::new(RecordingStore::new(MemoryStore::new()));
        let ctx = FsContext::from_arc(store.clone()).with_ids(SequentialIds::new("n"));
        let mut root = root(&ctx).await;
        let mutator = Mutator::new(&ctx);
        mutator.create_folder(&mut root, "a").await.unwrap();
        mutator.create_file(&mut root, "b", "").await.unwrap();
        store.clear();

        let err = mutator.create_file(&mut root, "a", "").await.unwrap_err();
        assert!(matches!(err, FsError::DuplicateName { name } if name == "a"));

        let err = mutator.rename_child(&mut root, "b", "a").await.unwrap_err();
        assert!(matches!(err, FsError::DuplicateName { .. }));

        assert!(store.writes().is_empty(), "rejected edits must not write");
        assert!(root.as_folder().unwrap().duplicate_names().is_empty());
    }

    #[tokio::test]
    async fn invalid_names_are_rejected() {
        let ctx = ctx();
        let mut root = root(&ctx).await;
        let mutator = Mutator::new(&ctx);

        for name in ["", "a/b", ".."] {
            let err = mutator.create_folder(&mut root, name).await.unwrap_err();
            assert!(matches!(err, FsError::InvalidName { .. }), "{name:?}");
        }
    }

    #[tokio::test]
    async fn rename_changes_name_but_not_key() {
        let ctx = ctx();
        let mut root = root(&ctx).await;
        let mutator = Mutator::new(&ctx);
        let entry = mutator.create_file(&mut root, "old", "body").await.unwrap();

        mutator.rename_child(&mut root, "old", "new").await.unwrap();

        let renamed = root.as_folder().unwrap().entry_by_name("new").unwrap();
        assert_eq!(renamed.id, entry.id);
        assert!(resolve(&ctx, "/old").await.unwrap().is_none());
        let resolved = resolve(&ctx, "/new").await.unwrap().unwrap();
        assert_eq!(resolved.key, entry.id);
    }

    #[tokio::test]
    async fn rename_to_same_name_is_a_no_op() {
        let store = Arc::new(RecordingStore::new(MemoryStore::new()));
        let ctx = FsContext::from_arc(store.clone()).with_ids(SequentialIds::new("n"));
        let mut root = root(&ctx).await;
        let mutator = Mutator::new(&ctx);
        mutator.create_file(&mut root, "same", "").await.unwrap();
        store.clear();

        mutator.rename_child(&mut root, "same", "same").await.unwrap();

        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn missing_entries_are_reported() {
        let ctx = ctx();
        let mut root = root(&ctx).await;
        let mutator = Mutator::new(&ctx);

        assert!(matches!(
            mutator.rename_child(&mut root, "nope", "x").await,
            Err(FsError::EntryNotFound { .. })
        ));
        assert!(matches!(
            mutator.delete_child(&mut root, "nope").await,
            Err(FsError::EntryNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn mutating_a_file_as_folder_fails() {
        let ctx = ctx();
        let mut root = root(&ctx).await;
        let mutator = Mutator::new(&ctx);
        mutator.create_file(&mut root, "f", "").await.unwrap();
        let mut file = resolve(&ctx, "/f").await.unwrap().unwrap();

        assert!(matches!(
            mutator.create_folder(&mut file, "x").await,
            Err(FsError::NotAFolder { .. })
        ));
        assert!(matches!(
            mutator.replace_contents(&mut root, "x").await,
            Err(FsError::NotAFile { .. })
        ));
    }

    #[tokio::test]
    async fn replace_contents_keeps_key() {
        let ctx = ctx();
        let mut root = root(&ctx).await;
        let mutator = Mutator::new(&ctx);
        mutator.create_file(&mut root, "f", "one").await.unwrap();
        let mut file = resolve(&ctx, "/f").await.unwrap().unwrap();

        mutator.replace_contents(&mut file, "two").await.unwrap();

        let reread = resolve(&ctx, "/f").await.unwrap().unwrap();
        assert_eq!(reread.key, file.key);
        assert_eq!(reread.as_file().unwrap().contents, b"two");
        assert_eq!(reread, file);
    }

    #[tokio::test]
    async fn failed_child_write_leaves_parent_untouched() {
        let store = Arc::new(FailingStore::new(MemoryStore::new()));
        let ctx = FsContext::from_arc(store.clone()).with_ids(SequentialIds::new("n"));
        let mut root = root(&ctx).await;
        let before = root.clone();

        store.fail_write(0);
        let result = Mutator::new(&ctx).create_folder(&mut root, "docs").await;

        assert!(matches!(result, Err(FsError::Store(_))));
        assert_eq!(root, before, "caller's view must not change");
        assert_eq!(load_node(&ctx, "/").await.unwrap(), Some(before.node));
        assert!(!store.inner().contains_key("n0"));
    }

    #[tokio::test]
    async fn failed_parent_write_leaves_only_an_orphan() {
        let store = Arc::new(FailingStore::new(MemoryStore::new()));
        let ctx = FsContext::from_arc(store.clone()).with_ids(SequentialIds::new("n"));
        let mut root = root(&ctx).await;
        let before = root.clone();

        store.fail_write(1);
        let result = Mutator::new(&ctx).create_folder(&mut root, "docs").await;

        assert!(result.is_err());
        assert_eq!(root, before);
        assert_eq!(load_node(&ctx, "/").await.unwrap(), Some(before.node));
        assert!(
            store.inner().contains_key("n0"),
            "the child was written first and is now an unreferenced orphan"
        );
    }

    #[tokio::test]
    async fn failed_child_delete_keeps_parent_consistent() {
        let store = Arc::new(FailingStore::new(MemoryStore::new()));
        let ctx = FsContext::from_arc(store.clone()).with_ids(SequentialIds::new("n"));
        let mut root = root(&ctx).await;
        let mutator = Mutator::new(&ctx);
        let entry = mutator.create_file(&mut root, "f", "").await.unwrap();

        store.fail_write(1);
        let result = mutator.delete_child(&mut root, &entry.id).await;

        assert!(result.is_err());
        assert!(root.as_folder().unwrap().is_empty(), "parent was rewritten");
        assert!(resolve(&ctx, "/f").await.unwrap().is_none());
        assert!(store.inner().contains_key("n0"), "child key is orphaned");
    }
}
