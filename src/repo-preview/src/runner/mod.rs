//! Orchestrates preview runs.
//!
//! A run resolves its targets once, then processes them one at a time:
//! fetch metadata, pick the document (cloned page or rendered card),
//! capture it and persist the artifact. A failing target is logged and
//! skipped; only setup failures abort the run.

mod config;
mod error;
mod phase;

pub use config::RunnerConfig;
pub use error::{RunnerError, TargetFailure};
pub use phase::RunPhase;

use crate::capture::{CaptureEngine, CaptureError, ChromeCapture, MarkupPreview};
use crate::checkout::{checkout_document, CheckoutSource};
use crate::metadata::{GitHubMetadata, MetadataFetcher};
use crate::summary::{ProcessingResult, RunSummary};
use crate::targets::{
    AuthenticatedTargets, ListingOptions, OrganizationTargets, RepositoryIdentifier,
    StaticTargets, TargetResolver, TargetStrategy,
};
use crate::templates::{CardRenderer, RenderedDocument};
use crate::workspace::Workspace;
use octocrab::Octocrab;
use phase::PhaseTracker;
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, warn, Instrument};

/// Runs previews against GitHub.
pub struct Runner {
    config: RunnerConfig,
    octocrab: Octocrab,
    renderer: CardRenderer,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the GitHub client cannot be built or the
    /// card template cannot be loaded.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let mut builder = Octocrab::builder();
        if let Some(token) = config.token() {
            builder = builder.personal_token(token.to_string());
        }
        let octocrab = builder.build()?;

        let canvas = config.settings().canvas();
        let renderer = match &config.settings().template {
            Some(path) => CardRenderer::from_template_file(canvas, path)?,
            None => CardRenderer::new(canvas)?,
        };

        Ok(Self {
            config,
            octocrab,
            renderer,
        })
    }

    /// Executes the full run.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] on setup failures. Per-target failures are
    /// reported in the returned summary instead.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let resolver = resolver_for(&self.config, &self.octocrab);
        let fetcher = GitHubMetadata::new(
            self.octocrab.clone(),
            self.config.organization(),
            self.config.settings().api_timeout(),
        );
        let pipeline = Pipeline::new(&self.config, &self.renderer, resolver.as_ref(), &fetcher);

        if self.config.dry_run() {
            pipeline.run(|| Ok(MarkupPreview)).await
        } else {
            let options = self.config.capture_options();
            pipeline.run(move || ChromeCapture::launch(options)).await
        }
    }
}

/// Selects the resolver for the configured strategy.
fn resolver_for(config: &RunnerConfig, octocrab: &Octocrab) -> Box<dyn TargetResolver> {
    let listing = || ListingOptions {
        organization: config.organization().to_string(),
        exclude: config.exclude().to_vec(),
        timeout: config.settings().api_timeout(),
    };

    match config.settings().strategy {
        TargetStrategy::Static => Box::new(StaticTargets::new(
            config.repositories().to_vec(),
            config.exclude().to_vec(),
        )),
        TargetStrategy::Organization => {
            Box::new(OrganizationTargets::new(octocrab.clone(), listing()))
        }
        TargetStrategy::Authenticated => {
            Box::new(AuthenticatedTargets::new(octocrab.clone(), listing()))
        }
    }
}

/// The batch pipeline, independent of where targets, metadata and images
/// come from.
pub struct Pipeline<'a> {
    config: &'a RunnerConfig,
    renderer: &'a CardRenderer,
    resolver: &'a dyn TargetResolver,
    fetcher: &'a dyn MetadataFetcher,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline from its collaborators.
    #[must_use]
    pub fn new(
        config: &'a RunnerConfig,
        renderer: &'a CardRenderer,
        resolver: &'a dyn TargetResolver,
        fetcher: &'a dyn MetadataFetcher,
    ) -> Self {
        Self {
            config,
            renderer,
            resolver,
            fetcher,
        }
    }

    /// Runs the pipeline, launching the capture engine with `launch`.
    ///
    /// The engine is acquired once during initialization and shut down once
    /// at the end; the work directory is removed on every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the token is missing, the workspace cannot
    /// be prepared or the engine fails to launch.
    pub async fn run<E, L>(&self, launch: L) -> Result<RunSummary, RunnerError>
    where
        E: CaptureEngine,
        L: FnOnce() -> Result<E, CaptureError>,
    {
        let mut phase = PhaseTracker::new();
        let mut summary = RunSummary::new(self.config.dry_run());

        phase.advance(RunPhase::Initializing);
        let (workspace, engine) = match self.initialize(launch) {
            Ok(acquired) => acquired,
            Err(e) => {
                error!(error = %e, "Setup failed, aborting run");
                phase.advance(RunPhase::Aborted);
                return Err(e);
            }
        };

        phase.advance(RunPhase::Resolving);
        let targets = self.resolver.resolve().await;
        summary.targets_resolved = targets.len();

        if targets.is_empty() {
            warn!("No targets to process");
        } else {
            info!(count = targets.len(), "Processing targets");
            self.fetcher.prepare(targets.len()).await;

            let total = targets.len();
            for (index, target) in targets.iter().enumerate() {
                phase.advance(RunPhase::ProcessingTarget);
                let span = info_span!("target", repo = %target, n = index + 1, total);
                let result = self
                    .process_target(&workspace, &engine, target)
                    .instrument(span)
                    .await;
                summary.record_result(result);
            }
        }

        phase.advance(RunPhase::Finalizing);
        engine.shutdown().await;
        workspace.finish();
        phase.advance(RunPhase::Done);

        info!(
            captured = summary.captured,
            degraded = summary.degraded,
            failed = summary.failed,
            "Run complete"
        );
        Ok(summary)
    }

    /// Checks the credential, prepares the directories and launches the engine.
    fn initialize<E, L>(&self, launch: L) -> Result<(Workspace, E), RunnerError>
    where
        E: CaptureEngine,
        L: FnOnce() -> Result<E, CaptureError>,
    {
        if self.config.token().is_none() {
            return Err(RunnerError::MissingCredential {
                reason: self.config.token_purpose(),
            });
        }

        let workspace = Workspace::prepare(self.config.output_dir(), self.config.work_dir())?;
        let engine = launch()?;
        Ok((workspace, engine))
    }

    async fn process_target<E: CaptureEngine>(
        &self,
        workspace: &Workspace,
        engine: &E,
        target: &RepositoryIdentifier,
    ) -> ProcessingResult {
        match self.capture_target(workspace, engine, target).await {
            Ok((path, degraded)) => {
                info!(path = %path.display(), degraded, "Wrote preview");
                ProcessingResult::Captured {
                    repository: target.clone(),
                    path,
                    degraded,
                }
            }
            Err(e) => {
                warn!(repo = %target, error = %e, "Failed to capture preview, skipping");
                ProcessingResult::Failed {
                    repository: target.clone(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Produces the artifact for one target. The target's scratch directory
    /// is dropped, and so deleted, on every return path.
    async fn capture_target<E: CaptureEngine>(
        &self,
        workspace: &Workspace,
        engine: &E,
        target: &RepositoryIdentifier,
    ) -> Result<(PathBuf, bool), TargetFailure> {
        let fetched = self.fetcher.fetch(target).await;
        let scratch = workspace.target_dir(target)?;

        let document = match self.checkout(target, scratch.path()).await {
            Some(document) => document,
            None => self.renderer.render(&fetched.metadata)?,
        };
        let document = document.materialize(scratch.path())?;

        let bytes = engine.capture(target, &document).await?;
        let path = workspace.persist(target, engine.extension(), &bytes)?;
        Ok((path, fetched.degraded))
    }

    /// Clones the target and returns its own preview document, if configured
    /// and present. Checkout problems fall back to the rendered card.
    async fn checkout(
        &self,
        target: &RepositoryIdentifier,
        scratch: &Path,
    ) -> Option<RenderedDocument> {
        let settings = self.config.settings();
        let document_path = settings.document_path.as_deref()?;
        let source = CheckoutSource {
            organization: self.config.organization(),
            identifier: target,
            token: self.config.token(),
        };

        match checkout_document(&source, document_path, scratch, settings.clone_timeout()).await {
            Ok(Some(path)) => {
                info!(path = %document_path.display(), "Using repository preview document");
                Some(RenderedDocument::File {
                    path,
                    canvas: self.renderer.canvas(),
                })
            }
            Ok(None) => None,
            Err(e) => {
                warn!(repo = %target, error = %e, "Checkout failed, rendering card instead");
                None
            }
        }
    }
}
