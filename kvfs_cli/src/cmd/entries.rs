use anyhow::{Context, Result};
use kvfs_fs::{Namespace, NodeKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;

pub async fn run_ls(ns: &Namespace, path: &str) -> Result<()> {
    for entry in ns.list(path).await? {
        match entry.kind {
            NodeKind::Folder => println!("{}/", entry.name),
            NodeKind::File => println!("{}", entry.name),
        }
    }
    Ok(())
}

pub async fn run_cat(ns: &Namespace, path: &str) -> Result<()> {
    let contents = ns.read(path).await?;
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&contents).await?;
    stdout.flush().await?;
    Ok(())
}

pub async fn run_mkdir(ns: &Namespace, path: &str) -> Result<()> {
    let entry = ns.create_folder(path).await?;
    info!(path, id = %entry.id, "created folder");
    Ok(())
}

pub async fn run_touch(ns: &Namespace, path: &str) -> Result<()> {
    let entry = ns.create_file(path, Vec::new()).await?;
    info!(path, id = %entry.id, "created file");
    Ok(())
}

pub async fn run_write(ns: &Namespace, path: &str, contents: Option<String>) -> Result<()> {
    let contents = match contents {
        Some(text) => text.into_bytes(),
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("failed to read contents from stdin")?;
            buf
        }
    };

    let len = contents.len();
    if ns.resolve(path).await?.is_some() {
        ns.write(path, contents).await?;
    } else {
        ns.create_file(path, contents).await?;
    }
    info!(path, bytes = len, "wrote file");
    Ok(())
}

pub async fn run_mv(ns: &Namespace, path: &str, new_name: &str) -> Result<()> {
    let new_path = ns.rename(path, new_name).await?;
    println!("{new_path}");
    Ok(())
}

pub async fn run_rm(ns: &Namespace, path: &str) -> Result<()> {
    let removed = ns.remove(path).await?;
    info!(path, kind = %removed.kind, "removed");
    if removed.kind == NodeKind::Folder {
        info!("anything below {path} is now unreachable; run `kvfs gc` to reclaim it");
    }
    Ok(())
}
