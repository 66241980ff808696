//! The namespace behaves the same on every persistent backend, and survives
//! reopening the store.

use kvfs_core::Store;
use kvfs_fs::gc::collect_garbage;
use kvfs_fs::{FsContext, Namespace};
use kvfs_store_local::LocalStore;
use kvfs_store_redb::RedbStore;
use tempfile::tempdir;

async fn exercise<S: Store>(store: S) -> Namespace {
    let ns = Namespace::open(FsContext::new(store));

    ns.create_folder("/docs").await.unwrap();
    ns.create_file("/docs/readme", "hello").await.unwrap();
    ns.rename("/docs/readme", "notes").await.unwrap();
    ns.create_folder("/tmp").await.unwrap();
    ns.create_file("/tmp/scratch", "x").await.unwrap();
    ns.remove("/tmp").await.unwrap();

    assert!(ns.resolve("/docs/readme").await.unwrap().is_none());
    assert_eq!(ns.read("/docs/notes").await.unwrap(), b"hello");
    assert!(ns.resolve("/tmp/scratch").await.unwrap().is_none());

    let report = collect_garbage(ns.context(), false).await.unwrap();
    assert_eq!(report.deleted, 1, "the file inside /tmp was orphaned");
    ns
}

#[tokio::test]
async fn local_store_round_trip() {
    let dir = tempdir().unwrap();
    exercise(LocalStore::new(dir.path())).await;

    // Reopen over the same directory
    let ns = Namespace::open(FsContext::new(LocalStore::new(dir.path())));
    assert_eq!(ns.read("/docs/notes").await.unwrap(), b"hello");
    let names: Vec<String> = ns
        .list("/")
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, vec!["docs"]);
}

#[tokio::test]
async fn redb_store_round_trip() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("kvfs.redb");
    let ns = exercise(RedbStore::open(&db_path).unwrap()).await;
    drop(ns);

    let ns = Namespace::open(FsContext::new(RedbStore::open(&db_path).unwrap()));
    assert_eq!(ns.read("/docs/notes").await.unwrap(), b"hello");
}
