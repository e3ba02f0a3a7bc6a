//! Repository checkout for repositories that ship their own preview page.
//!
//! When a document path is configured, each target is shallow-cloned into its
//! work directory and the HTML file at that path is captured instead of the
//! generated card.

mod error;

pub use error::CheckoutError;

use crate::targets::RepositoryIdentifier;
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Directory name of the clone inside a target's work directory.
const CLONE_DIR: &str = "repository";

/// Location of a repository to clone.
#[derive(Debug, Clone)]
pub struct CheckoutSource<'a> {
    /// Organization owning the repository.
    pub organization: &'a str,
    /// Repository to clone.
    pub identifier: &'a RepositoryIdentifier,
    /// Token used for HTTPS authentication.
    pub token: Option<&'a str>,
}

/// Shallow-clones a repository into `work_dir` and returns the path of the
/// requested document, or `None` if the repository does not contain it.
///
/// # Errors
///
/// Returns [`CheckoutError`] if the document path is not a plain relative
/// path, or if `git clone` fails or exceeds `timeout`.
pub async fn checkout_document(
    source: &CheckoutSource<'_>,
    document_path: &Path,
    work_dir: &Path,
    timeout: Duration,
) -> Result<Option<PathBuf>, CheckoutError> {
    validate_document_path(document_path)?;

    let clone_dir = work_dir.join(CLONE_DIR);
    tokio::time::timeout(timeout, clone_repository(source, &clone_dir))
        .await
        .map_err(|_| CheckoutError::Timeout {
            timeout_secs: timeout.as_secs(),
        })??;

    let document = clone_dir.join(document_path);
    if document.is_file() {
        Ok(Some(document))
    } else {
        debug!(
            repo = %source.identifier,
            path = %document_path.display(),
            "Repository has no preview document"
        );
        Ok(None)
    }
}

/// Rejects absolute paths and `..` components.
fn validate_document_path(path: &Path) -> Result<(), CheckoutError> {
    let plain = !path.as_os_str().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));

    if plain {
        Ok(())
    } else {
        Err(CheckoutError::InvalidDocumentPath {
            path: path.display().to_string(),
        })
    }
}

/// Builds the HTTPS clone URL, embedding the token when present.
fn clone_url(source: &CheckoutSource<'_>) -> String {
    match source.token {
        Some(token) => format!(
            "https://x-access-token:{}@github.com/{}/{}.git",
            token, source.organization, source.identifier
        ),
        None => format!(
            "https://github.com/{}/{}.git",
            source.organization, source.identifier
        ),
    }
}

/// Clones a repository to a local path.
async fn clone_repository(source: &CheckoutSource<'_>, path: &Path) -> Result<(), CheckoutError> {
    debug!(repo = %source.identifier, "Cloning repository");

    let output = Command::new("git")
        .arg("clone")
        .args(["--depth", "1", "--quiet"])
        .arg(clone_url(source))
        .arg(path)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| CheckoutError::CloneFailed {
            message: format!("Failed to execute git clone: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = match source.token {
            Some(token) => stderr.replace(token, "***"),
            None => stderr.into_owned(),
        };
        return Err(CheckoutError::CloneFailed {
            message: format!("git clone failed: {}", stderr.trim()),
        });
    }

    Ok(())
}
