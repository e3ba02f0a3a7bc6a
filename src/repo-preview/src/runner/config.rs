//! Runner configuration.

use crate::capture::CaptureOptions;
use crate::config::{ConfigError, PreviewSettings};
use crate::targets::{RepositoryIdentifier, TargetStrategy};
use std::path::{Path, PathBuf};

/// Immutable configuration for a preview run.
///
/// Built once at startup from validated [`PreviewSettings`] plus the
/// command-line only options, then passed by reference to every component.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Validated settings.
    settings: PreviewSettings,
    /// GitHub token used for API calls and clones.
    token: Option<String>,
    /// Whether to write HTML cards instead of launching a browser.
    dry_run: bool,
    /// Chrome binary override.
    chrome_path: Option<PathBuf>,
    /// Whether Chrome's sandbox is enabled.
    sandbox: bool,
    /// Parsed static target list.
    repositories: Vec<RepositoryIdentifier>,
    /// Parsed exclusion list.
    exclude: Vec<RepositoryIdentifier>,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    ///
    /// `source` names where the settings came from in validation messages.
    /// A blank token counts as no token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the settings are invalid.
    pub fn new(
        settings: PreviewSettings,
        source: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let source: String = source.into();
        settings.validate(&source)?;
        let repositories = settings.repository_identifiers(&source)?;
        let exclude = settings.excluded_identifiers(&source)?;
        let token = token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        Ok(Self {
            settings,
            token,
            dry_run: false,
            chrome_path: None,
            sandbox: true,
            repositories,
            exclude,
        })
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets a custom Chrome binary.
    #[must_use]
    pub fn with_chrome_path(mut self, chrome_path: Option<PathBuf>) -> Self {
        self.chrome_path = chrome_path;
        self
    }

    /// Enables or disables Chrome's sandbox.
    #[must_use]
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Returns the validated settings.
    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    /// Returns the configured organization.
    pub fn organization(&self) -> &str {
        &self.settings.organization
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the static target list.
    pub fn repositories(&self) -> &[RepositoryIdentifier] {
        &self.repositories
    }

    /// Returns the exclusion list.
    pub fn exclude(&self) -> &[RepositoryIdentifier] {
        &self.exclude
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.settings.output_dir
    }

    /// Returns the run work directory.
    pub fn work_dir(&self) -> &Path {
        &self.settings.work_dir
    }

    /// What the token is first needed for, for the missing-credential error.
    /// Every run needs one since metadata requests are authenticated.
    pub fn token_purpose(&self) -> String {
        match self.settings.strategy {
            TargetStrategy::Static => "fetching repository metadata".to_string(),
            strategy => format!("the {} strategy", strategy.as_str()),
        }
    }

    /// Options for the browser-backed capture engine.
    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            canvas: self.settings.canvas(),
            readiness: self.settings.readiness,
            navigation_timeout: self.settings.navigation_timeout(),
            chrome_path: self.chrome_path.clone(),
            sandbox: self.sandbox,
        }
    }
}
