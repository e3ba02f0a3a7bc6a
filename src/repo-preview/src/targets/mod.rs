//! Target resolution.
//!
//! Produces the ordered list of repositories to process in a run, from one of
//! three sources: a static list, the organization's repository listing, or
//! the repositories visible to the authenticated token filtered by owner.

mod error;
mod identifier;

pub use error::TargetError;
pub use identifier::RepositoryIdentifier;

use crate::rate_limit::ensure_core_budget;
use async_trait::async_trait;
use octocrab::models::Repository;
use octocrab::{Octocrab, Page};
use serde::Deserialize;
use std::collections::HashSet;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

/// Results per page for repository listings.
const RESULTS_PER_PAGE: u8 = 100;

/// Source of the target list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetStrategy {
    /// The configured repository list, used as-is.
    #[default]
    Static,
    /// Every repository listed for the organization.
    Organization,
    /// Repositories visible to the token, filtered to the organization.
    Authenticated,
}

impl TargetStrategy {
    /// Returns the configuration name of the strategy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Organization => "organization",
            Self::Authenticated => "authenticated",
        }
    }
}

impl FromStr for TargetStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(Self::Static),
            "organization" | "org" => Ok(Self::Organization),
            "authenticated" | "user" => Ok(Self::Authenticated),
            other => Err(format!(
                "unknown strategy '{other}', expected static, organization or authenticated"
            )),
        }
    }
}

/// Produces the repositories to process.
///
/// Implementations never fail: a listing that cannot be retrieved is logged
/// and yields an empty list, which the runner treats as a clean no-op run.
#[async_trait]
pub trait TargetResolver: Send + Sync {
    /// Returns the targets in processing order.
    async fn resolve(&self) -> Vec<RepositoryIdentifier>;
}

/// Resolver returning a fixed list.
///
/// The list keeps its configured order; repeated and excluded names are
/// dropped the same way as for the listing strategies.
#[derive(Debug, Clone)]
pub struct StaticTargets {
    repositories: Vec<RepositoryIdentifier>,
    exclude: Vec<RepositoryIdentifier>,
}

impl StaticTargets {
    /// Creates a resolver for the given list.
    #[must_use]
    pub fn new(
        repositories: Vec<RepositoryIdentifier>,
        exclude: Vec<RepositoryIdentifier>,
    ) -> Self {
        Self {
            repositories,
            exclude,
        }
    }
}

#[async_trait]
impl TargetResolver for StaticTargets {
    async fn resolve(&self) -> Vec<RepositoryIdentifier> {
        let targets = distinct_targets(self.repositories.iter().cloned(), &self.exclude);
        info!(
            configured = self.repositories.len(),
            count = targets.len(),
            "Using static target list"
        );
        targets
    }
}

/// Shared settings for the GitHub listing strategies.
#[derive(Debug, Clone)]
pub struct ListingOptions {
    /// Organization (or user) owning the repositories.
    pub organization: String,
    /// Repository names never processed, e.g. the catalog's own repository.
    pub exclude: Vec<RepositoryIdentifier>,
    /// Timeout for a single page request.
    pub timeout: Duration,
}

/// Resolver listing every repository of the organization.
pub struct OrganizationTargets {
    octocrab: Octocrab,
    options: ListingOptions,
}

impl OrganizationTargets {
    /// Creates the resolver.
    #[must_use]
    pub fn new(octocrab: Octocrab, options: ListingOptions) -> Self {
        Self { octocrab, options }
    }

    async fn list(&self) -> Result<Vec<Repository>, TargetError> {
        let timeout = self.options.timeout;
        ensure_core_budget(&self.octocrab, 1, timeout).await;
        let first = with_timeout(
            timeout,
            self.octocrab
                .orgs(&self.options.organization)
                .list_repos()
                .per_page(RESULTS_PER_PAGE)
                .send(),
        )
        .await?;

        collect_pages(&self.octocrab, first, timeout).await
    }
}

#[async_trait]
impl TargetResolver for OrganizationTargets {
    async fn resolve(&self) -> Vec<RepositoryIdentifier> {
        let span = info_span!(
            "resolve",
            strategy = "organization",
            org = %self.options.organization
        );

        async {
            info!("Listing organization repositories");
            match self.list().await {
                Ok(repositories) => {
                    let listed = repositories.iter().map(ListedRepository::from).collect();
                    let targets = select_identifiers(listed, None, &self.options.exclude);
                    info!(count = targets.len(), "Resolved targets");
                    targets
                }
                Err(e) => {
                    warn!(error = %e, "Failed to list repositories, nothing to process");
                    Vec::new()
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Resolver listing the repositories visible to the token.
///
/// Useful for private organization repositories the organization listing
/// does not return for the token's permissions.
pub struct AuthenticatedTargets {
    octocrab: Octocrab,
    options: ListingOptions,
}

impl AuthenticatedTargets {
    /// Creates the resolver.
    #[must_use]
    pub fn new(octocrab: Octocrab, options: ListingOptions) -> Self {
        Self { octocrab, options }
    }

    async fn list(&self) -> Result<Vec<Repository>, TargetError> {
        let timeout = self.options.timeout;
        ensure_core_budget(&self.octocrab, 1, timeout).await;
        let first = with_timeout(
            timeout,
            self.octocrab
                .current()
                .list_repos_for_authenticated_user()
                .per_page(RESULTS_PER_PAGE)
                .send(),
        )
        .await?;

        collect_pages(&self.octocrab, first, timeout).await
    }
}

#[async_trait]
impl TargetResolver for AuthenticatedTargets {
    async fn resolve(&self) -> Vec<RepositoryIdentifier> {
        let span = info_span!(
            "resolve",
            strategy = "authenticated",
            org = %self.options.organization
        );

        async {
            info!("Listing repositories visible to the token");
            match self.list().await {
                Ok(repositories) => {
                    let listed = repositories.iter().map(ListedRepository::from).collect();
                    let targets = select_identifiers(
                        listed,
                        Some(&self.options.organization),
                        &self.options.exclude,
                    );
                    info!(count = targets.len(), "Resolved targets");
                    targets
                }
                Err(e) => {
                    warn!(error = %e, "Failed to list repositories, nothing to process");
                    Vec::new()
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Follows the `next` links of a listing until the provider reports no more pages.
async fn collect_pages(
    octocrab: &Octocrab,
    mut page: Page<Repository>,
    timeout: Duration,
) -> Result<Vec<Repository>, TargetError> {
    let mut all = std::mem::take(&mut page.items);

    while page.next.is_some() {
        ensure_core_budget(octocrab, 1, timeout).await;
        let Some(mut next) =
            with_timeout(timeout, octocrab.get_page::<Repository>(&page.next)).await?
        else {
            break;
        };

        debug!(count = next.items.len(), "Fetched listing page");
        all.append(&mut next.items);
        page = next;
    }

    Ok(all)
}

async fn with_timeout<T>(
    timeout: Duration,
    request: impl Future<Output = octocrab::Result<T>>,
) -> Result<T, TargetError> {
    tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| TargetError::Timeout {
            timeout_secs: timeout.as_secs(),
        })?
        .map_err(TargetError::from)
}

/// Owner and name of a listed repository.
#[derive(Debug, Clone)]
pub(crate) struct ListedRepository {
    owner: Option<String>,
    name: String,
}

impl From<&Repository> for ListedRepository {
    fn from(repository: &Repository) -> Self {
        Self {
            owner: repository.owner.as_ref().map(|owner| owner.login.clone()),
            name: repository.name.clone(),
        }
    }
}

/// Turns a provider listing into targets.
///
/// Drops names from other owners when `owner` is given and names that are not
/// valid identifiers, then applies [`distinct_targets`].
fn select_identifiers(
    listed: Vec<ListedRepository>,
    owner: Option<&str>,
    exclude: &[RepositoryIdentifier],
) -> Vec<RepositoryIdentifier> {
    let candidates = listed
        .into_iter()
        .filter(|repository| match owner {
            Some(owner) => repository
                .owner
                .as_deref()
                .is_some_and(|login| login.eq_ignore_ascii_case(owner)),
            None => true,
        })
        .filter_map(|repository| match RepositoryIdentifier::new(repository.name) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "Skipping listed repository");
                None
            }
        });

    distinct_targets(candidates, exclude)
}

/// Keeps the first occurrence of every name, in order, minus `exclude`.
/// Comparisons ignore ASCII case like GitHub does.
fn distinct_targets(
    candidates: impl IntoIterator<Item = RepositoryIdentifier>,
    exclude: &[RepositoryIdentifier],
) -> Vec<RepositoryIdentifier> {
    let excluded: HashSet<String> = exclude
        .iter()
        .map(|id| id.as_str().to_ascii_lowercase())
        .collect();
    let mut seen = HashSet::new();

    candidates
        .into_iter()
        .filter(|id| {
            let key = id.as_str().to_ascii_lowercase();
            if excluded.contains(&key) {
                debug!(repo = %id, "Excluded");
                return false;
            }
            seen.insert(key)
        })
        .collect()
}
