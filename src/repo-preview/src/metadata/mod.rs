//! Repository metadata retrieval.
//!
//! Failures never abort the batch: the fetcher logs a warning and hands back
//! a placeholder record so the target is still rendered.

mod error;
mod record;

pub use error::MetadataError;
pub use record::{
    RepositoryMetadata, RepositoryResponse, MISSING_DESCRIPTION, UNAVAILABLE_DESCRIPTION,
    UNKNOWN_LANGUAGE,
};

use crate::rate_limit::ensure_core_budget;
use crate::targets::RepositoryIdentifier;
use async_trait::async_trait;
use chrono::Utc;
use octocrab::Octocrab;
use std::time::Duration;
use tracing::{debug, warn};

/// Metadata for one target, and whether it is a placeholder.
#[derive(Debug, Clone)]
pub struct FetchedMetadata {
    /// The record to render.
    pub metadata: RepositoryMetadata,
    /// True when the real metadata was unavailable.
    pub degraded: bool,
}

/// Retrieves metadata for a target.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Called once before the first fetch with the number of targets.
    async fn prepare(&self, _targets: usize) {}

    /// Returns a complete record for `identifier`, degrading to a
    /// placeholder on failure.
    async fn fetch(&self, identifier: &RepositoryIdentifier) -> FetchedMetadata;
}

/// Fetches metadata from the GitHub REST API.
pub struct GitHubMetadata {
    octocrab: Octocrab,
    organization: String,
    timeout: Duration,
}

impl GitHubMetadata {
    /// Creates a fetcher for repositories of `organization`.
    #[must_use]
    pub fn new(octocrab: Octocrab, organization: impl Into<String>, timeout: Duration) -> Self {
        Self {
            octocrab,
            organization: organization.into(),
            timeout,
        }
    }

    async fn request(
        &self,
        identifier: &RepositoryIdentifier,
    ) -> Result<RepositoryResponse, MetadataError> {
        let route = format!("/repos/{}/{}", self.organization, identifier);
        tokio::time::timeout(self.timeout, self.octocrab.get(route, None::<&()>))
            .await
            .map_err(|_| MetadataError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(MetadataError::from)
    }
}

#[async_trait]
impl MetadataFetcher for GitHubMetadata {
    async fn prepare(&self, targets: usize) {
        ensure_core_budget(&self.octocrab, targets as u64, self.timeout).await;
    }

    async fn fetch(&self, identifier: &RepositoryIdentifier) -> FetchedMetadata {
        match self.request(identifier).await {
            Ok(response) => {
                debug!(repo = %identifier, "Fetched repository metadata");
                FetchedMetadata {
                    metadata: RepositoryMetadata::from_response(
                        &self.organization,
                        identifier,
                        response,
                        Utc::now(),
                    ),
                    degraded: false,
                }
            }
            Err(e) => {
                warn!(
                    repo = %identifier,
                    error = %e,
                    "Failed to fetch metadata, using placeholder"
                );
                FetchedMetadata {
                    metadata: RepositoryMetadata::placeholder(
                        &self.organization,
                        identifier,
                        Utc::now(),
                    ),
                    degraded: true,
                }
            }
        }
    }
}
