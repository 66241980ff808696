use anyhow::{Result, bail};
use kvfs_fs::Namespace;
use kvfs_fs::check::{Problem, check_tree};
use kvfs_fs::gc::collect_garbage;
use kvfs_fs::path::ROOT_PATH;

pub async fn run_tree(ns: &Namespace, path: Option<String>) -> Result<()> {
    let start = path.unwrap_or_else(|| ROOT_PATH.to_owned());
    // Make sure an empty store shows an empty root rather than "not found"
    ns.root().await?;
    let tree = kvfs_fs::debug::render_tree(ns.context(), &start).await?;
    print!("{tree}");
    Ok(())
}

pub async fn run_check(ns: &Namespace) -> Result<()> {
    let report = check_tree(ns.context()).await?;
    if report.problems == [Problem::MissingRoot] {
        println!("empty namespace: no root folder has been written yet");
        return Ok(());
    }

    println!(
        "{} folders, {} files, {} keys referenced",
        report.folders,
        report.files,
        report.referenced.len()
    );
    for problem in &report.problems {
        println!("problem: {problem}");
    }
    if !report.is_clean() {
        bail!("found {} problem(s)", report.problems.len());
    }
    Ok(())
}

pub async fn run_gc(ns: &Namespace, dry_run: bool) -> Result<()> {
    let report = collect_garbage(ns.context(), dry_run).await?;
    for key in &report.orphans {
        if dry_run {
            println!("would delete {key}");
        } else {
            println!("deleted {key}");
        }
    }
    println!(
        "{} reachable, {} orphaned, {} deleted",
        report.reachable,
        report.orphans.len(),
        report.deleted
    );
    Ok(())
}
