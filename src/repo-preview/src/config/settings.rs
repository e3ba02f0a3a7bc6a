//! Settings file deserialization.

use crate::capture::ReadinessPolicy;
use crate::config::ConfigError;
use crate::targets::{RepositoryIdentifier, TargetStrategy};
use crate::templates::Canvas;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Settings for a preview run, usually read from a TOML file.
///
/// ```toml
/// organization = "acme"
/// strategy = "organization"
/// exclude = ["acme.github.io"]
/// output-dir = "previews"
/// readiness = "dom-content-loaded"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PreviewSettings {
    /// Organization (or user) owning the repositories.
    pub organization: String,

    /// How the target list is produced.
    pub strategy: TargetStrategy,

    /// Repositories processed by the static strategy.
    pub repositories: Vec<String>,

    /// Repositories never processed, whatever the strategy.
    pub exclude: Vec<String>,

    /// Directory receiving the images. Recreated on every run.
    pub output_dir: PathBuf,

    /// Scratch directory for the run. Removed when the run ends.
    pub work_dir: PathBuf,

    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,

    /// When a page counts as ready to capture.
    pub readiness: ReadinessPolicy,

    /// Upper bound for page navigation and readiness.
    pub navigation_timeout_secs: u64,

    /// Upper bound for a single GitHub API request.
    pub api_timeout_secs: u64,

    /// Upper bound for cloning a repository.
    pub clone_timeout_secs: u64,

    /// Custom Handlebars card template.
    pub template: Option<PathBuf>,

    /// HTML document inside each repository to capture instead of the card.
    pub document_path: Option<PathBuf>,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            organization: String::new(),
            strategy: TargetStrategy::default(),
            repositories: Vec::new(),
            exclude: Vec::new(),
            output_dir: PathBuf::from("previews"),
            work_dir: PathBuf::from(".repo-preview-work"),
            width: Canvas::OPEN_GRAPH.width,
            height: Canvas::OPEN_GRAPH.height,
            readiness: ReadinessPolicy::default(),
            navigation_timeout_secs: 30,
            api_timeout_secs: 10,
            clone_timeout_secs: 120,
            template: None,
            document_path: None,
        }
    }
}

impl PreviewSettings {
    /// Loads settings from a TOML file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, or not
    /// valid settings TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading settings");

        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Validates the settings. `source` names where they came from and is
    /// used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self, source: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::ValidationError {
            path: source.to_string(),
            message: message.to_string(),
        };

        if self.organization.trim().is_empty() {
            return Err(invalid("organization cannot be empty"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(invalid("width and height must be greater than zero"));
        }
        if self.navigation_timeout_secs == 0
            || self.api_timeout_secs == 0
            || self.clone_timeout_secs == 0
        {
            return Err(invalid("timeouts must be greater than zero"));
        }
        if self.strategy == TargetStrategy::Static && self.repositories.is_empty() {
            return Err(invalid(
                "the static strategy needs at least one entry in repositories",
            ));
        }
        let output_dir = absolute_dir(&self.output_dir).map_err(|e| invalid(&e))?;
        let work_dir = absolute_dir(&self.work_dir).map_err(|e| invalid(&e))?;
        if output_dir.starts_with(&work_dir) || work_dir.starts_with(&output_dir) {
            return Err(invalid(
                "output-dir and work-dir must be separate, neither inside the other",
            ));
        }

        self.repository_identifiers(source)?;
        self.excluded_identifiers(source)?;
        Ok(())
    }

    /// Canvas size of the images.
    #[must_use]
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Parsed `repositories` list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an invalid name.
    pub fn repository_identifiers(
        &self,
        source: &str,
    ) -> Result<Vec<RepositoryIdentifier>, ConfigError> {
        parse_identifiers(&self.repositories, source)
    }

    /// Parsed `exclude` list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an invalid name.
    pub fn excluded_identifiers(
        &self,
        source: &str,
    ) -> Result<Vec<RepositoryIdentifier>, ConfigError> {
        parse_identifiers(&self.exclude, source)
    }

    /// Timeout for page navigation and readiness.
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Timeout for a single API request.
    #[must_use]
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    /// Timeout for cloning a repository.
    #[must_use]
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }
}

fn parse_identifiers(
    names: &[String],
    source: &str,
) -> Result<Vec<RepositoryIdentifier>, ConfigError> {
    names
        .iter()
        .map(|name| {
            RepositoryIdentifier::new(name.trim()).map_err(|e| ConfigError::ValidationError {
                path: source.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Resolves `path` against the current directory and folds `.` and `..`
/// lexically. Both run directories are deleted recursively, so they are
/// compared in this form.
fn absolute_dir(path: &Path) -> Result<PathBuf, String> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| format!("cannot resolve '{}': {e}", path.display()))?
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
