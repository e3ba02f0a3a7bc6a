//! Processing result types.

use crate::targets::RepositoryIdentifier;
use std::path::PathBuf;

/// Result of processing a single repository.
#[derive(Debug, Clone)]
pub enum ProcessingResult {
    /// An artifact was written.
    Captured {
        /// Repository processed.
        repository: RepositoryIdentifier,
        /// Path of the written artifact.
        path: PathBuf,
        /// Whether placeholder metadata was rendered.
        degraded: bool,
    },

    /// No artifact was written.
    Failed {
        /// Repository processed.
        repository: RepositoryIdentifier,
        /// Error message.
        error: String,
    },
}

impl ProcessingResult {
    /// Repository the result belongs to.
    #[must_use]
    pub fn repository(&self) -> &RepositoryIdentifier {
        match self {
            Self::Captured { repository, .. } | Self::Failed { repository, .. } => repository,
        }
    }
}
