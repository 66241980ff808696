use crate::config::StoreKind;
use crate::init_config::CmdConfig;
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use clap_verbosity_flag::InfoLevel;
use directories::ProjectDirs;
use std::path::PathBuf;

mod browser;
mod cmd;
mod config;
mod init_config;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// config file to use instead of the default location
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// use this kind of store with its default location, ignoring the config file
    #[arg(short, long, value_name = "KIND")]
    store: Option<StoreKind>,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<InfoLevel>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Modify the kvfs config
    Config {
        #[command(subcommand)]
        cmd: CmdConfig,
    },
    /// List the entries of a folder
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print the contents of a file
    Cat { path: String },
    /// Create an empty folder
    Mkdir { path: String },
    /// Create an empty file
    Touch { path: String },
    /// Replace the contents of a file, creating it if needed.
    /// Reads the contents from stdin when none are given.
    Write {
        path: String,
        contents: Option<String>,
    },
    /// Rename an entry within its folder
    Mv { path: String, new_name: String },
    /// Remove an entry from its folder. Folders are not removed
    /// recursively; run `kvfs gc` to reclaim what was below them.
    Rm { path: String },
    /// Print a tree of the namespace for debugging
    Tree {
        /// Optional folder to start from
        #[arg(long, value_name = "PATH")]
        path: Option<String>,
    },
    /// Walk the namespace and report structural problems
    Check,
    /// Delete stored nodes that are no longer reachable from the root
    Gc {
        /// If set, only print which keys would be deleted.
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Browse and edit the namespace interactively
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    // Layout:
    // - Config:  ~/.config/kvfs/config.toml
    // - Data:    ~/.local/share/kvfs/
    let dirs =
        ProjectDirs::from("", "", "kvfs").context("failed to determine config directory path")?;

    let config_file = cli
        .config
        .unwrap_or_else(|| dirs.config_dir().join("config.toml"));

    cmd::run_command(config_file, dirs.data_dir(), cli.store, cli.cmd).await
}
