use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::WorkspaceSettings;

use super::error::InfraError;

const WORKSPACE_PREFIX: &str = "markdown-to-pdf-";

/// Per-run scratch directory holding probe files and committed artifacts.
///
/// The directory is removed when the workspace is dropped unless it was
/// configured to be kept.
#[derive(Debug)]
pub struct Workspace {
    storage: Storage,
}

#[derive(Debug)]
enum Storage {
    Temporary(TempDir),
    Kept(PathBuf),
}

impl Workspace {
    pub fn create(settings: &WorkspaceSettings) -> Result<Self, InfraError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let dir = match settings.root.as_ref() {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|err| {
            InfraError::workspace(format!("failed to create workspace directory: {err}"))
        })?;

        let storage = if settings.keep {
            let path = dir.keep();
            info!(
                target = "infra::workspace",
                path = %path.display(),
                "Workspace will be kept after the run"
            );
            Storage::Kept(path)
        } else {
            debug!(
                target = "infra::workspace",
                path = %dir.path().display(),
                "Workspace created"
            );
            Storage::Temporary(dir)
        };

        Ok(Self { storage })
    }

    pub fn path(&self) -> &Path {
        match &self.storage {
            Storage::Temporary(dir) => dir.path(),
            Storage::Kept(path) => path,
        }
    }

    /// Remove the directory now, surfacing any removal error.
    pub fn close(self) -> Result<(), InfraError> {
        match self.storage {
            Storage::Temporary(dir) => {
                let path = dir.path().to_path_buf();
                dir.close().map_err(|err| {
                    InfraError::workspace(format!(
                        "failed to remove workspace {}: {err}",
                        path.display()
                    ))
                })
            }
            Storage::Kept(path) => {
                info!(
                    target = "infra::workspace",
                    path = %path.display(),
                    "Workspace kept"
                );
                Ok(())
            }
        }
    }
}
