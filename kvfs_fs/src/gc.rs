//! Reclaims keys that no folder entry references any more.
//!
//! Orphans appear when a folder with children is deleted (delete is not
//! recursive) or when a create is interrupted after writing the child but
//! before rewriting the parent. They are harmless but never freed otherwise.

use futures::StreamExt;
use tracing::info;

use crate::check::check_tree;
use crate::context::FsContext;
use crate::{FsError, FsResult};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GcReport {
    /// Keys reachable from the root, including the root itself.
    pub reachable: usize,
    /// Unreferenced keys found, sorted.
    pub orphans: Vec<String>,
    /// How many of `orphans` were actually deleted.
    pub deleted: usize,
}

/// Deletes every key in the store that is not reachable from the root.
///
/// This assumes the store holds one namespace and nothing else. It is
/// conservative: if any referenced key is missing or cannot be decoded, the
/// subtree below it is unknown and nothing is deleted. With `dry_run` the
/// orphans are only reported.
pub async fn collect_garbage(ctx: &FsContext, dry_run: bool) -> FsResult<GcReport> {
    let check = check_tree(ctx).await?;
    if let Some(problem) = check
        .problems
        .iter()
        .find(|problem| problem.breaks_reachability())
    {
        return Err(FsError::Inconsistent(problem.to_string()));
    }

    let mut orphans = Vec::new();
    let mut keys = ctx.store.list().await?;
    while let Some(key) = keys.next().await {
        let key = key?;
        if !check.referenced.contains(&key) {
            orphans.push(key);
        }
    }
    orphans.sort();

    let mut deleted = 0;
    if !dry_run {
        for key in &orphans {
            ctx.store.delete(key).await?;
            info!(key = %key, "gc: deleted orphaned key");
            deleted += 1;
        }
    }

    Ok(GcReport {
        reachable: check.referenced.len(),
        orphans,
        deleted,
    })
}
