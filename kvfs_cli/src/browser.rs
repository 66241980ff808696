//! Navigation state for the interactive shell.
//!
//! The browser always shows exactly one view. Navigating first enters
//! `Loading` for the target path and then settles on a folder listing, a
//! file, or "not found" once the path has been resolved. Structural edits
//! happen relative to the folder being shown and refresh it afterwards.

use anyhow::{Context, bail};
use kvfs_fs::path::{self, ROOT_PATH};
use kvfs_fs::{DirEntry, Namespace, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading { path: String },
    Folder { path: String, entries: Vec<DirEntry> },
    File { path: String, contents: Vec<u8> },
    NotFound { path: String },
}

impl View {
    pub fn path(&self) -> &str {
        match self {
            View::Loading { path }
            | View::Folder { path, .. }
            | View::File { path, .. }
            | View::NotFound { path } => path,
        }
    }
}

#[derive(Debug)]
pub struct Browser {
    ns: Namespace,
    view: View,
}

impl Browser {
    pub fn new(ns: Namespace) -> Self {
        Self {
            ns,
            view: View::Loading {
                path: ROOT_PATH.to_owned(),
            },
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    #[cfg(test)]
    pub fn namespace(&self) -> &Namespace {
        &self.ns
    }

    /// Turns shell input into an absolute path. Relative input is taken
    /// relative to the folder currently in view.
    pub fn target(&self, input: &str) -> String {
        if input.starts_with(path::SEPARATOR) {
            input.to_owned()
        } else {
            path::join(&self.folder_path(), input)
        }
    }

    /// The folder in view, or the folder holding the file in view.
    pub fn folder_path(&self) -> String {
        match &self.view {
            View::File { path, .. } => path::parent(path).unwrap_or_else(|| ROOT_PATH.to_owned()),
            other => other.path().to_owned(),
        }
    }

    /// Shows `target`. If it cannot be resolved because of an error, the
    /// previous view is restored and the error returned.
    pub async fn navigate(&mut self, target: &str) -> anyhow::Result<&View> {
        let previous = std::mem::replace(
            &mut self.view,
            View::Loading {
                path: target.to_owned(),
            },
        );
        let resolved = match self.ns.resolve(target).await {
            Ok(resolved) => resolved,
            Err(err) => {
                self.view = previous;
                return Err(err.into());
            }
        };

        self.view = match resolved.map(|resolved| resolved.node) {
            Some(Node::Folder(folder)) => View::Folder {
                path: target.to_owned(),
                entries: folder.entries,
            },
            Some(Node::File(file)) => View::File {
                path: target.to_owned(),
                contents: file.contents,
            },
            None => View::NotFound {
                path: target.to_owned(),
            },
        };
        Ok(&self.view)
    }

    pub async fn up(&mut self) -> anyhow::Result<&View> {
        let parent = path::parent(self.view.path()).unwrap_or_else(|| ROOT_PATH.to_owned());
        self.navigate(&parent).await
    }

    pub async fn refresh(&mut self) -> anyhow::Result<&View> {
        let current = self.view.path().to_owned();
        self.navigate(&current).await
    }

    pub async fn create_folder(&mut self, name: &str) -> anyhow::Result<DirEntry> {
        let folder = self.require_folder("mkdir")?;
        let entry = self.ns.create_folder(&path::join(&folder, name)).await?;
        self.refresh().await?;
        Ok(entry)
    }

    pub async fn create_file(&mut self, name: &str) -> anyhow::Result<DirEntry> {
        let folder = self.require_folder("touch")?;
        let entry = self
            .ns
            .create_file(&path::join(&folder, name), Vec::new())
            .await?;
        self.refresh().await?;
        Ok(entry)
    }

    pub async fn rename(&mut self, name: &str, new_name: &str) -> anyhow::Result<String> {
        let folder = self.require_folder("mv")?;
        let new_path = self.ns.rename(&path::join(&folder, name), new_name).await?;
        self.refresh().await?;
        Ok(new_path)
    }

    pub async fn remove(&mut self, name: &str) -> anyhow::Result<DirEntry> {
        let folder = self.require_folder("rm")?;
        let removed = self.ns.remove(&path::join(&folder, name)).await?;
        self.refresh().await?;
        Ok(removed)
    }

    /// Replaces the contents of the file in view and returns to its folder.
    pub async fn save(&mut self, contents: Vec<u8>) -> anyhow::Result<&View> {
        let View::File { path, .. } = &self.view else {
            bail!("save: no file is open");
        };
        let file_path = path.clone();
        self.ns
            .write(&file_path, contents)
            .await
            .with_context(|| format!("failed to save {file_path}"))?;
        let parent = path::parent(&file_path).unwrap_or_else(|| ROOT_PATH.to_owned());
        self.navigate(&parent).await
    }

    fn require_folder(&self, action: &str) -> anyhow::Result<String> {
        match &self.view {
            View::Folder { path, .. } => Ok(path.clone()),
            other => bail!("{action}: {} is not an open folder", other.path()),
        }
    }
}
