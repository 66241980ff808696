use std::path::{Path, PathBuf};

use anyhow::Result;
use kvfs_fs::{FsContext, Namespace};

use crate::config::{KvfsConfig, StoreConfig, StoreKind, create_store};

mod entries;
mod maintenance;
mod shell;

pub use entries::{run_cat, run_ls, run_mkdir, run_mv, run_rm, run_touch, run_write};
pub use maintenance::{run_check, run_gc, run_tree};
pub use shell::run_shell;

pub async fn run_command(
    config_file: PathBuf,
    local_data_dir: &Path,
    store_override: Option<StoreKind>,
    cmd: crate::Commands,
) -> Result<()> {
    if let crate::Commands::Config { cmd } = cmd {
        return cmd.run(config_file, local_data_dir);
    }

    let store_config = match store_override {
        Some(kind) => StoreConfig::default_for(kind, local_data_dir)?,
        None => KvfsConfig::load_or_default(&config_file, local_data_dir)?.store,
    };
    let ns = Namespace::open(FsContext::from_arc(create_store(store_config)?));

    match cmd {
        crate::Commands::Ls { path } => run_ls(&ns, &path).await,
        crate::Commands::Cat { path } => run_cat(&ns, &path).await,
        crate::Commands::Mkdir { path } => run_mkdir(&ns, &path).await,
        crate::Commands::Touch { path } => run_touch(&ns, &path).await,
        crate::Commands::Write { path, contents } => run_write(&ns, &path, contents).await,
        crate::Commands::Mv { path, new_name } => run_mv(&ns, &path, &new_name).await,
        crate::Commands::Rm { path } => run_rm(&ns, &path).await,
        crate::Commands::Tree { path } => run_tree(&ns, path).await,
        crate::Commands::Check => run_check(&ns).await,
        crate::Commands::Gc { dry_run } => run_gc(&ns, dry_run).await,
        crate::Commands::Shell => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_shell(ns, stdin, tokio::io::stdout()).await
        }
        crate::Commands::Config { .. } => unreachable!(),
    }
}
