//! Repository identifiers.

use super::TargetError;
use serde::Serialize;
use std::fmt;

/// Name of a repository within the configured organization.
///
/// Only characters GitHub accepts in repository names are allowed, so an
/// identifier is always safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RepositoryIdentifier(String);

impl RepositoryIdentifier {
    /// Validates and wraps a repository name.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::InvalidIdentifier`] for empty names, `.`/`..`,
    /// or names containing anything other than ASCII alphanumerics, `.`, `-`
    /// and `_`.
    pub fn new(name: impl Into<String>) -> Result<Self, TargetError> {
        let name = name.into();
        let valid_chars = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));

        if name.is_empty() || name == "." || name == ".." || !valid_chars {
            return Err(TargetError::InvalidIdentifier { name });
        }

        Ok(Self(name))
    }

    /// Returns the repository name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the artifact produced for this repository.
    #[must_use]
    pub fn artifact_file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.0)
    }
}

impl fmt::Display for RepositoryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RepositoryIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_github_names() {
        for name in ["demo", "my-repo", "repo_1", "acme.github.io", ".github"] {
            assert!(RepositoryIdentifier::new(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_path_like_names() {
        for name in ["", ".", "..", "a/b", "../etc", "with space", "a\\b"] {
            assert!(
                matches!(
                    RepositoryIdentifier::new(name),
                    Err(TargetError::InvalidIdentifier { .. })
                ),
                "{name}"
            );
        }
    }

    #[test]
    fn builds_artifact_file_name() {
        let id = RepositoryIdentifier::new("demo").unwrap();
        assert_eq!(id.artifact_file_name("png"), "demo.png");
    }
}
