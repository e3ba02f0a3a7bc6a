//! Target resolution error types.

use thiserror::Error;

/// Errors that can occur while resolving targets.
#[derive(Debug, Error)]
pub enum TargetError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// A repository name that cannot be used as a target.
    #[error("Invalid repository name '{name}'")]
    InvalidIdentifier { name: String },

    /// The listing request did not finish in time.
    #[error("Repository listing timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}
