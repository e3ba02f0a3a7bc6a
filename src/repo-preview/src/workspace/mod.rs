//! Output and scratch directory management.
//!
//! The output directory is recreated empty at the start of a run and only
//! ever receives complete artifacts. Scratch space lives under a run work
//! directory: one [`TempDir`] per target, removed when the target finishes,
//! and the work directory itself removed when the run finishes.

mod error;

pub use error::WorkspaceError;

use crate::targets::RepositoryIdentifier;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Directories used by a run.
#[derive(Debug)]
pub struct Workspace {
    output_dir: PathBuf,
    work_dir: PathBuf,
    finished: bool,
}

impl Workspace {
    /// Recreates `output_dir` empty and replaces any stale `work_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] if either directory cannot be cleared or
    /// created.
    pub fn prepare(output_dir: &Path, work_dir: &Path) -> Result<Self, WorkspaceError> {
        recreate_dir(output_dir)?;

        if work_dir.exists() {
            warn!(path = %work_dir.display(), "Removing stale work directory");
        }
        recreate_dir(work_dir)?;

        info!(
            output = %output_dir.display(),
            work = %work_dir.display(),
            "Prepared workspace"
        );
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            work_dir: work_dir.to_path_buf(),
            finished: false,
        })
    }

    /// Directory receiving the artifacts.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run-level scratch directory.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Creates a scratch directory for one target. It is deleted when the
    /// returned handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Io`] if the directory cannot be created.
    pub fn target_dir(&self, identifier: &RepositoryIdentifier) -> Result<TempDir, WorkspaceError> {
        tempfile::Builder::new()
            .prefix(&format!("{identifier}-"))
            .tempdir_in(&self.work_dir)
            .map_err(|source| WorkspaceError::Io {
                path: self.work_dir.display().to_string(),
                source,
            })
    }

    /// Path of the artifact for `identifier`.
    #[must_use]
    pub fn artifact_path(&self, identifier: &RepositoryIdentifier, extension: &str) -> PathBuf {
        self.output_dir
            .join(identifier.artifact_file_name(extension))
    }

    /// Writes an artifact atomically: the bytes go to a temporary file in the
    /// output directory which is then renamed into place, so a failure never
    /// leaves a partial file behind.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Io`] if writing or renaming fails.
    pub fn persist(
        &self,
        identifier: &RepositoryIdentifier,
        extension: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, WorkspaceError> {
        let path = self.artifact_path(identifier, extension);
        let io_error = |source| WorkspaceError::Io {
            path: path.display().to_string(),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix(".partial-")
            .tempfile_in(&self.output_dir)
            .map_err(io_error)?;
        file.write_all(bytes).map_err(io_error)?;
        file.as_file().sync_all().map_err(io_error)?;
        file.persist(&path).map_err(|e| io_error(e.error))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Wrote artifact");
        Ok(path)
    }

    /// Removes the run work directory.
    pub fn finish(mut self) {
        self.remove_work_dir();
    }

    fn remove_work_dir(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        match std::fs::remove_dir_all(&self.work_dir) {
            Ok(()) => debug!(path = %self.work_dir.display(), "Removed work directory"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.work_dir.display(),
                error = %e,
                "Failed to remove work directory"
            ),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.remove_work_dir();
    }
}

/// Removes `path` if it exists and creates it empty.
fn recreate_dir(path: &Path) -> Result<(), WorkspaceError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(WorkspaceError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    }

    std::fs::create_dir_all(path).map_err(|source| WorkspaceError::Io {
        path: path.display().to_string(),
        source,
    })
}
