use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::HandlerError;

/// Per-invocation scratch directory.
pub trait Workspace {
    fn dir(&self) -> &Path;

    /// Leaves `dir()` existing and empty, discarding anything a reused sandbox
    /// left behind.
    fn setup(&self) -> io::Result<()>;

    /// Removes `dir()` and its contents. A missing directory is not an error.
    fn cleanup(&self) -> io::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalWorkspace {
    dir: PathBuf,
}

impl LocalWorkspace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Workspace for LocalWorkspace {
    fn dir(&self) -> &Path {
        &self.dir
    }

    fn setup(&self) -> io::Result<()> {
        remove_dir_if_present(&self.dir)?;
        fs::create_dir_all(&self.dir)
    }

    fn cleanup(&self) -> io::Result<()> {
        remove_dir_if_present(&self.dir)
    }
}

fn remove_dir_if_present(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Holds a set-up workspace for the duration of one invocation and cleans it
/// up exactly once when dropped, whether the invocation returned or failed.
pub struct ScratchLease<'a, W: Workspace + ?Sized> {
    workspace: &'a W,
}

impl<'a, W: Workspace + ?Sized> ScratchLease<'a, W> {
    pub fn acquire(workspace: &'a W) -> Result<Self, HandlerError> {
        // Built before setup so a half-created directory is still removed.
        let lease = Self { workspace };
        workspace
            .setup()
            .map_err(|source| HandlerError::Workspace {
                action: "setup",
                path: workspace.dir().to_path_buf(),
                source,
            })?;
        Ok(lease)
    }

    pub fn dir(&self) -> &Path {
        self.workspace.dir()
    }
}

impl<W: Workspace + ?Sized> Drop for ScratchLease<'_, W> {
    fn drop(&mut self) {
        if let Err(error) = self.workspace.cleanup() {
            tracing::warn!(
                component = "workspace",
                event = "cleanup_failed",
                path = %self.workspace.dir().display(),
                error = %error,
            );
        }
    }
}
