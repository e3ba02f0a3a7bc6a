//! Metadata fetch error types.

use thiserror::Error;

/// Errors that can occur while fetching repository metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// GitHub API error, including non-success statuses.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// The request did not finish in time.
    #[error("Metadata request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}
