//! Runner error types.

use crate::capture::CaptureError;
use crate::config::ConfigError;
use crate::templates::TemplateError;
use crate::workspace::WorkspaceError;

/// Errors that abort a run. Each one maps to a non-zero exit status.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading and validation errors.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A GitHub token is required but was not supplied.
    #[error("A GitHub token is required for {reason}")]
    MissingCredential { reason: String },

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Output or work directory could not be prepared.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// The capture engine could not be launched.
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// The card template could not be loaded.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Errors that fail a single target without affecting the others.
#[derive(Debug, thiserror::Error)]
pub enum TargetFailure {
    /// Scratch directory or artifact write failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// Card rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The rendered document could not be written to disk.
    #[error("Failed to write document: {0}")]
    Document(#[from] std::io::Error),

    /// Capture failed or timed out.
    #[error(transparent)]
    Capture(#[from] CaptureError),
}
