//! Generates Open Graph social-preview images for GitHub repositories.
//!
//! A run resolves the repositories of an organization, fetches their
//! metadata, renders a fixed-size HTML card per repository and screenshots
//! it with headless Chrome into `<output-dir>/<repository>.png`.
//!
//! Failures are isolated per repository: missing metadata degrades to a
//! placeholder card, and a failed capture only skips that repository's image.

pub mod capture;
pub mod checkout;
pub mod config;
pub mod metadata;
pub mod rate_limit;
pub mod runner;
pub mod summary;
pub mod targets;
pub mod templates;
pub mod workspace;

pub use capture::{
    CaptureEngine, CaptureError, CaptureOptions, ChromeCapture, MarkupPreview, ReadinessPolicy,
};
pub use checkout::{checkout_document, CheckoutError, CheckoutSource};
pub use config::{ConfigError, PreviewSettings};
pub use metadata::{
    FetchedMetadata, GitHubMetadata, MetadataError, MetadataFetcher, RepositoryMetadata,
    RepositoryResponse,
};
pub use rate_limit::{check_core_rate_limit, ensure_core_budget, RateLimitInfo};
pub use runner::{Pipeline, RunPhase, Runner, RunnerConfig, RunnerError, TargetFailure};
pub use summary::{ProcessingResult, RunSummary};
pub use targets::{
    AuthenticatedTargets, ListingOptions, OrganizationTargets, RepositoryIdentifier,
    StaticTargets, TargetError, TargetResolver, TargetStrategy,
};
pub use templates::{language_color, Canvas, CardRenderer, RenderedDocument, TemplateError};
pub use workspace::{Workspace, WorkspaceError};
