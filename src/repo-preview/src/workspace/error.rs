//! Workspace error types.

use thiserror::Error;

/// Errors that can occur while managing run directories.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A directory or file could not be created, cleared or written.
    #[error("Filesystem error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
